use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use crate::domain::models::booking::BookingForm;
use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub session_id: String,
    pub date: NaiveDate,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub time_slot: String,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation("date", "Invalid date format"))
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}

/// Checks a new booking, stopping at the first problem.
pub fn validate_new_booking(form: &BookingForm) -> Result<ValidatedBooking, AppError> {
    let session_id = present(&form.session_id)
        .ok_or(AppError::validation("sessionId", "Please select a session"))?;

    let date = present(&form.date)
        .ok_or(AppError::validation("date", "Please select a date"))
        .and_then(parse_date)?;

    let name = present(&form.name)
        .ok_or(AppError::validation("name", "Please enter your name"))?;

    let email = present(&form.email)
        .filter(|e| is_valid_email(e))
        .ok_or(AppError::validation("email", "Please enter a valid email address"))?;

    let mobile = present(&form.mobile)
        .ok_or(AppError::validation("mobile", "Please enter your mobile number"))?;
    if !is_valid_mobile(mobile) {
        return Err(AppError::validation("mobile", "Mobile number must be exactly 10 digits"));
    }

    let time_slot = present(&form.time_slot)
        .ok_or(AppError::validation("timeSlot", "Please select a time slot"))?;

    Ok(ValidatedBooking {
        session_id: session_id.to_string(),
        date,
        name: name.to_string(),
        email: email.to_string(),
        mobile: mobile.to_string(),
        time_slot: time_slot.to_string(),
    })
}

/// Checks an edited booking. Only presence is enforced here; contact
/// details are not re-validated on edit.
pub fn validate_booking_edit(form: &BookingForm) -> Result<ValidatedBooking, AppError> {
    let name = present(&form.name)
        .ok_or(AppError::validation("name", "Please fill in all fields"))?;
    let email = present(&form.email)
        .ok_or(AppError::validation("email", "Please fill in all fields"))?;
    let mobile = present(&form.mobile)
        .ok_or(AppError::validation("mobile", "Please fill in all fields"))?;

    let session_id = present(&form.session_id)
        .ok_or(AppError::validation("sessionId", "Please select a session"))?;

    let date = present(&form.date)
        .ok_or(AppError::validation("date", "Please select a date"))
        .and_then(parse_date)?;

    let time_slot = present(&form.time_slot)
        .ok_or(AppError::validation("timeSlot", "Please select a time slot"))?;

    Ok(ValidatedBooking {
        session_id: session_id.to_string(),
        date,
        name: name.to_string(),
        email: email.to_string(),
        mobile: mobile.to_string(),
        time_slot: time_slot.to_string(),
    })
}
