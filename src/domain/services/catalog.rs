use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use std::cmp::Reverse;
use crate::domain::models::session::{DateEntry, LiveSession, Slot};

/// Calendar date of `now` in the booking timezone.
pub fn today_in(tz: &Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Keeps sessions that still offer a date on or after `today`, soonest first.
/// Sessions sharing the same next date are ordered newest first.
pub fn list_bookable(sessions: Vec<LiveSession>, today: NaiveDate) -> Vec<LiveSession> {
    let mut bookable: Vec<(NaiveDate, LiveSession)> = sessions.into_iter()
        .filter_map(|s| s.earliest_date_from(today).map(|d| (d, s)))
        .collect();

    bookable.sort_by_key(|(next, s)| (*next, Reverse(s.created_at)));
    bookable.into_iter().map(|(_, s)| s).collect()
}

pub fn available_dates(session: &LiveSession, today: NaiveDate) -> Vec<DateEntry> {
    session.dates.iter()
        .filter(|d| d.date >= today)
        .cloned()
        .collect()
}

/// Slots a user may pick. A full slot stays visible when it is the one
/// the booking being edited already holds.
pub fn available_slots(entry: &DateEntry, current_slot: Option<&str>) -> Vec<Slot> {
    entry.time_slots.iter()
        .filter(|slot| slot.has_capacity() || current_slot.is_some_and(|c| c == slot.time()))
        .cloned()
        .collect()
}
