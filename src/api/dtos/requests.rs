use crate::domain::models::booking::BookingForm;
use crate::domain::models::session::SessionSchedule;
use serde::Deserialize;

/// Accepts both the dated and the legacy flat schedule shape.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub session_name: String,
    #[serde(flatten)]
    pub schedule: SessionSchedule,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsQuery {
    pub date: String,
    pub current_slot: Option<String>,
}

pub type CreateBookingRequest = BookingForm;
pub type UpdateBookingRequest = BookingForm;
