use crate::domain::models::{
    booking::SessionBooking,
    session::{LiveSession, SlotRef},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &LiveSession) -> Result<LiveSession, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<LiveSession>, AppError>;
    async fn list(&self) -> Result<Vec<LiveSession>, AppError>;
    /// Sessions with at least one date on or after `today`.
    async fn find_bookable_sessions(&self, today: NaiveDate) -> Result<Vec<LiveSession>, AppError>;
    /// Removes a session and its slots. Fails with `AppError::Conflict` while
    /// any booking still references it; the check and the delete share one transaction.
    async fn delete(&self, id: &str) -> Result<(), AppError>;

    /// Takes one seat from a slot. Fails with `AppError::Capacity` when the
    /// slot is already full at the moment of the write; open slots always succeed.
    async fn reserve_slot(&self, slot: &SlotRef) -> Result<(), AppError>;
    /// Gives one seat back, never dropping below zero.
    async fn release_slot(&self, slot: &SlotRef) -> Result<(), AppError>;
    /// Sets a managed counter still at zero to one. Returns whether it changed.
    async fn heal_slot_counter(&self, slot: &SlotRef) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create_booking(&self, booking: &SessionBooking) -> Result<SessionBooking, AppError>;
    /// Writes `booking` only if the stored record still holds `expected`.
    /// Fails with `AppError::Conflict` when another edit got there first.
    async fn update_booking(&self, booking: &SessionBooking, expected: &SlotRef) -> Result<SessionBooking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<SessionBooking>, AppError>;
    async fn list(&self) -> Result<Vec<SessionBooking>, AppError>;
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<SessionBooking>, AppError>;
}
