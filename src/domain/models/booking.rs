use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use crate::domain::models::session::SlotRef;

pub const STATUS_CONFIRMED: &str = "confirmed";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionBooking {
    pub id: String,
    pub session_id: String,
    pub session_name: String,
    pub session_date: NaiveDate,
    pub time_slot: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub status: String,
    pub booked_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub struct NewBookingParams {
    pub session_id: String,
    pub session_name: String,
    pub session_date: NaiveDate,
    pub time_slot: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
}

impl SessionBooking {
    pub fn new(params: NewBookingParams, booked_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: params.session_id,
            session_name: params.session_name,
            session_date: params.session_date,
            time_slot: params.time_slot,
            name: params.name,
            email: params.email,
            mobile: params.mobile,
            status: STATUS_CONFIRMED.to_string(),
            booked_at,
            updated_at: None,
        }
    }

    pub fn slot_ref(&self) -> SlotRef {
        SlotRef::new(self.session_id.clone(), self.session_date, self.time_slot.clone())
    }
}

/// Raw form values as the dashboard submits them. Every field may be
/// missing; validation decides which ones are required.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingForm {
    pub session_id: Option<String>,
    pub date: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub time_slot: Option<String>,
}
