use crate::domain::models::session::{DateEntry, Slot};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesResponse {
    pub session_id: String,
    pub dates: Vec<DateEntry>,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub date: NaiveDate,
    pub slots: Vec<Slot>,
}
