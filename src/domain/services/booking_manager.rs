use std::sync::Arc;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

use crate::domain::models::booking::{BookingForm, NewBookingParams, SessionBooking};
use crate::domain::models::session::{LiveSession, Slot, SlotRef};
use crate::domain::ports::{BookingRepository, SessionRepository};
use crate::domain::services::catalog::today_in;
use crate::domain::services::validation::{validate_booking_edit, validate_new_booking, ValidatedBooking};
use crate::error::AppError;

/// Creates and edits bookings and keeps slot counters in step with them.
///
/// Every counter change goes through `reserve_slot`/`release_slot`, which are
/// atomic per slot. A flow that touches more than one record reserves first
/// and undoes its reservation if a later write fails.
pub struct BookingManager {
    session_repo: Arc<dyn SessionRepository>,
    booking_repo: Arc<dyn BookingRepository>,
    timezone: Tz,
}

impl BookingManager {
    pub fn new(
        session_repo: Arc<dyn SessionRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        timezone: Tz,
    ) -> Self {
        Self { session_repo, booking_repo, timezone }
    }

    pub async fn create_booking(&self, form: &BookingForm, now: DateTime<Utc>) -> Result<SessionBooking, AppError> {
        let input = validate_new_booking(form)?;

        if input.date < today_in(&self.timezone, now) {
            return Err(AppError::validation("date", "Selected date is in the past"));
        }

        let session = self.load_session(&input.session_id).await?;
        let slot = resolve_slot(&session, &input)?;

        if !slot.has_capacity() {
            warn!("Booking rejected: slot {} on {} of session {} is full", input.time_slot, input.date, session.id);
            return Err(AppError::Capacity("Selected time slot is fully booked".into()));
        }

        let slot_ref = SlotRef::new(session.id.clone(), input.date, input.time_slot.clone());
        self.session_repo.reserve_slot(&slot_ref).await.inspect_err(|e| {
            if matches!(e, AppError::Capacity(_)) {
                warn!("Booking rejected: slot {} on {} filled up before commit", slot_ref.time, slot_ref.date);
            }
        })?;

        let booking = SessionBooking::new(NewBookingParams {
            session_id: session.id.clone(),
            session_name: session.session_name.clone(),
            session_date: input.date,
            time_slot: input.time_slot,
            name: input.name,
            email: input.email,
            mobile: input.mobile,
        }, now);

        match self.booking_repo.create_booking(&booking).await {
            Ok(created) => {
                info!("Booking confirmed: {} for session {} on {} at {}", created.id, created.session_id, created.session_date, created.time_slot);
                Ok(created)
            }
            Err(e) => {
                self.undo_reservation(&slot_ref).await;
                Err(e)
            }
        }
    }

    pub async fn update_booking(&self, booking_id: &str, form: &BookingForm, now: DateTime<Utc>) -> Result<SessionBooking, AppError> {
        let input = validate_booking_edit(form)?;

        let mut booking = self.booking_repo.find_by_id(booking_id).await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        let session = self.load_session(&input.session_id).await?;
        let slot = resolve_slot(&session, &input)?;

        let current = booking.slot_ref();
        let target = SlotRef::new(session.id.clone(), input.date, input.time_slot.clone());
        let moving = current != target;

        if moving && !slot.has_capacity() {
            warn!("Booking {} move rejected: slot {} on {} is full", booking.id, target.time, target.date);
            return Err(AppError::Capacity("Selected time slot is fully booked".into()));
        }

        booking.session_id = session.id.clone();
        booking.session_name = session.session_name.clone();
        booking.session_date = input.date;
        booking.time_slot = input.time_slot;
        booking.name = input.name;
        booking.email = input.email;
        booking.mobile = input.mobile;
        booking.updated_at = Some(now);

        if !moving {
            let updated = self.booking_repo.update_booking(&booking, &current).await?;
            if self.session_repo.heal_slot_counter(&target).await? {
                info!("Slot {} on {} of session {} had no counter; set to 1", target.time, target.date, target.session_id);
            }
            info!("Booking updated: {}", updated.id);
            return Ok(updated);
        }

        self.session_repo.reserve_slot(&target).await?;

        // Only applies while the stored booking still holds `current`.
        let updated = match self.booking_repo.update_booking(&booking, &current).await {
            Ok(updated) => updated,
            Err(e) => {
                if matches!(e, AppError::Conflict(_)) {
                    warn!("Booking {} was moved concurrently; returning seat {} on {}", booking.id, target.time, target.date);
                }
                self.undo_reservation(&target).await;
                return Err(e);
            }
        };

        match self.session_repo.release_slot(&current).await {
            Ok(()) => {}
            Err(AppError::NotFound(_)) => {
                warn!("Previous slot {} on {} of session {} no longer exists; nothing to release", current.time, current.date, current.session_id);
            }
            Err(e) => {
                error!("Booking {} moved but releasing {} on {} of session {} failed: {:?}", updated.id, current.time, current.date, current.session_id, e);
                return Err(e);
            }
        }

        info!("Booking {} moved from {} {} to {} {}", updated.id, current.date, current.time, target.date, target.time);
        Ok(updated)
    }

    async fn load_session(&self, session_id: &str) -> Result<LiveSession, AppError> {
        self.session_repo.find_by_id(session_id).await?
            .ok_or(AppError::NotFound("Session not found".into()))
    }

    async fn undo_reservation(&self, slot: &SlotRef) {
        if let Err(e) = self.session_repo.release_slot(slot).await {
            error!("Counter drift: could not release slot {} on {} of session {}: {:?}", slot.time, slot.date, slot.session_id, e);
        }
    }
}

fn resolve_slot<'a>(session: &'a LiveSession, input: &ValidatedBooking) -> Result<&'a Slot, AppError> {
    if session.date_entry(input.date).is_none() {
        return Err(AppError::validation("date", "Selected date is not offered by this session"));
    }
    session.find_slot(input.date, &input.time_slot)
        .ok_or(AppError::validation("timeSlot", "Selected time slot does not exist"))
}
