use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;
use crate::error::AppError;

/// A bookable time window. A bare label carries no counter; an object
/// tracks how many of its seats are taken.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Slot {
    Open(String),
    Managed {
        time: String,
        capacity: i32,
        #[serde(default)]
        booked: i32,
    },
}

impl Slot {
    pub fn time(&self) -> &str {
        match self {
            Slot::Open(label) => label,
            Slot::Managed { time, .. } => time,
        }
    }

    pub fn has_capacity(&self) -> bool {
        match self {
            Slot::Open(_) => true,
            Slot::Managed { capacity, booked, .. } => booked < capacity,
        }
    }

    fn trimmed(self) -> Slot {
        match self {
            Slot::Open(label) => Slot::Open(label.trim().to_string()),
            Slot::Managed { time, capacity, booked } => Slot::Managed { time: time.trim().to_string(), capacity, booked },
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateEntry {
    pub date: NaiveDate,
    pub time_slots: Vec<Slot>,
}

/// Incoming schedule shapes. Older documents put a single date and its
/// slots directly on the session; `migrate` lifts them into `dates`.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum SessionSchedule {
    Dated {
        dates: Vec<DateEntry>,
    },
    Legacy {
        date: NaiveDate,
        #[serde(rename = "timeSlots")]
        time_slots: Vec<Slot>,
    },
}

impl SessionSchedule {
    pub fn migrate(self) -> Vec<DateEntry> {
        match self {
            SessionSchedule::Dated { dates } => dates,
            SessionSchedule::Legacy { date, time_slots } => vec![DateEntry { date, time_slots }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LiveSession {
    pub id: String,
    pub session_name: String,
    pub dates: Vec<DateEntry>,
    pub created_at: DateTime<Utc>,
}

impl LiveSession {
    /// Slot labels are stored trimmed, matching how booking input is read.
    pub fn new(session_name: String, dates: Vec<DateEntry>) -> Self {
        let dates = dates.into_iter()
            .map(|entry| DateEntry {
                date: entry.date,
                time_slots: entry.time_slots.into_iter().map(Slot::trimmed).collect(),
            })
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            session_name,
            dates,
            created_at: Utc::now(),
        }
    }

    pub fn date_entry(&self, date: NaiveDate) -> Option<&DateEntry> {
        self.dates.iter().find(|d| d.date == date)
    }

    pub fn find_slot(&self, date: NaiveDate, time: &str) -> Option<&Slot> {
        self.date_entry(date)?.time_slots.iter().find(|s| s.time() == time)
    }

    pub fn earliest_date_from(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.dates.iter().map(|d| d.date).filter(|d| *d >= today).min()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.session_name.trim().is_empty() {
            return Err(AppError::validation("sessionName", "Session name is required"));
        }
        if self.dates.is_empty() {
            return Err(AppError::validation("dates", "At least one date is required"));
        }

        let mut seen_dates = HashSet::new();
        for entry in &self.dates {
            if !seen_dates.insert(entry.date) {
                return Err(AppError::validation("dates", format!("Date {} is listed more than once", entry.date)));
            }
            if entry.time_slots.is_empty() {
                return Err(AppError::validation("timeSlots", format!("Date {} has no time slots", entry.date)));
            }

            let mut seen_labels = HashSet::new();
            for slot in &entry.time_slots {
                if slot.time().trim().is_empty() {
                    return Err(AppError::validation("timeSlots", "Time slot label cannot be empty"));
                }
                if !seen_labels.insert(slot.time()) {
                    return Err(AppError::validation("timeSlots", format!("Slot {} is listed twice on {}", slot.time(), entry.date)));
                }
                if let Slot::Managed { capacity, booked, .. } = slot
                    && (*capacity < 0 || *booked < 0 || booked > capacity) {
                    return Err(AppError::validation("timeSlots", format!("Slot {} on {} must satisfy 0 <= booked <= capacity", slot.time(), entry.date)));
                }
            }
        }
        Ok(())
    }
}

/// Identifies one slot of one session date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRef {
    pub session_id: String,
    pub date: NaiveDate,
    pub time: String,
}

impl SlotRef {
    pub fn new(session_id: impl Into<String>, date: NaiveDate, time: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), date, time: time.into() }
    }
}

#[derive(Debug, FromRow, Clone)]
pub struct SessionRow {
    pub id: String,
    pub session_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow, Clone)]
pub struct SlotRow {
    pub session_id: String,
    pub slot_date: NaiveDate,
    pub time_label: String,
    pub capacity: Option<i32>,
    pub booked: i32,
    pub position: i32,
}

impl SlotRow {
    /// Flattens a session into rows, numbering slots in document order.
    pub fn from_session(session: &LiveSession) -> Vec<SlotRow> {
        session.dates.iter()
            .flat_map(|entry| entry.time_slots.iter().map(move |slot| (entry.date, slot)))
            .enumerate()
            .map(|(position, (date, slot))| {
                let (capacity, booked) = match slot {
                    Slot::Open(_) => (None, 0),
                    Slot::Managed { capacity, booked, .. } => (Some(*capacity), *booked),
                };
                SlotRow {
                    session_id: session.id.clone(),
                    slot_date: date,
                    time_label: slot.time().to_string(),
                    capacity,
                    booked,
                    position: position as i32,
                }
            })
            .collect()
    }

    fn into_slot(self) -> Slot {
        match self.capacity {
            None => Slot::Open(self.time_label),
            Some(capacity) => Slot::Managed { time: self.time_label, capacity, booked: self.booked },
        }
    }
}

/// Rebuilds sessions from stored rows, keeping the order of `sessions`.
/// `slots` must already be sorted by position within each session.
pub fn assemble_sessions(sessions: Vec<SessionRow>, slots: Vec<SlotRow>) -> Vec<LiveSession> {
    let mut by_session: HashMap<String, Vec<SlotRow>> = HashMap::new();
    for slot in slots {
        by_session.entry(slot.session_id.clone()).or_default().push(slot);
    }

    sessions.into_iter().map(|row| {
        let mut dates: Vec<DateEntry> = Vec::new();
        for slot in by_session.remove(&row.id).unwrap_or_default() {
            let date = slot.slot_date;
            match dates.iter_mut().find(|d| d.date == date) {
                Some(entry) => entry.time_slots.push(slot.into_slot()),
                None => dates.push(DateEntry { date, time_slots: vec![slot.into_slot()] }),
            }
        }
        LiveSession {
            id: row.id,
            session_name: row.session_name,
            dates,
            created_at: row.created_at,
        }
    }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_slot_wire_shapes() {
        let slots: Vec<Slot> = serde_json::from_value(json!([
            "09:00",
            {"time": "10:00", "capacity": 3, "booked": 1},
            {"time": "11:00", "capacity": 2}
        ])).unwrap();

        assert_eq!(slots[0], Slot::Open("09:00".into()));
        assert_eq!(slots[1], Slot::Managed { time: "10:00".into(), capacity: 3, booked: 1 });
        assert_eq!(slots[2], Slot::Managed { time: "11:00".into(), capacity: 2, booked: 0 }, "missing counter defaults to zero");

        let back = serde_json::to_value(&slots[0]).unwrap();
        assert_eq!(back, json!("09:00"));
    }

    #[test]
    fn test_legacy_schedule_is_migrated() {
        let legacy: SessionSchedule = serde_json::from_value(json!({
            "date": "2030-05-01",
            "timeSlots": ["09:00", {"time": "10:00", "capacity": 1, "booked": 0}]
        })).unwrap();

        let dates = legacy.migrate();
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].date, day("2030-05-01"));
        assert_eq!(dates[0].time_slots.len(), 2);

        let dated: SessionSchedule = serde_json::from_value(json!({
            "dates": [{"date": "2030-05-02", "timeSlots": ["08:00"]}]
        })).unwrap();
        assert!(matches!(dated, SessionSchedule::Dated { .. }));
    }

    #[test]
    fn test_validate_rejects_overbooked_and_duplicate_slots() {
        let over = LiveSession::new("Yoga".into(), vec![DateEntry {
            date: day("2030-01-01"),
            time_slots: vec![Slot::Managed { time: "09:00".into(), capacity: 1, booked: 2 }],
        }]);
        assert!(matches!(over.validate(), Err(AppError::Validation { field: "timeSlots", .. })));

        let dup = LiveSession::new("Yoga".into(), vec![DateEntry {
            date: day("2030-01-01"),
            time_slots: vec![Slot::Open("09:00".into()), Slot::Open("09:00".into())],
        }]);
        assert!(dup.validate().is_err());
    }

    #[test]
    fn test_slot_labels_are_trimmed() {
        let session = LiveSession::new("Yoga".into(), vec![DateEntry {
            date: day("2030-01-01"),
            time_slots: vec![
                Slot::Open(" 09:00".into()),
                Slot::Managed { time: "10:00 ".into(), capacity: 2, booked: 0 },
            ],
        }]);

        assert!(session.find_slot(day("2030-01-01"), "09:00").is_some());
        assert!(session.find_slot(day("2030-01-01"), "10:00").is_some());
        assert!(session.find_slot(day("2030-01-01"), " 09:00").is_none());

        let blank = LiveSession::new("Yoga".into(), vec![DateEntry {
            date: day("2030-01-01"),
            time_slots: vec![Slot::Open("   ".into())],
        }]);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_rows_round_trip_preserves_order() {
        let session = LiveSession::new("Pottery".into(), vec![
            DateEntry { date: day("2030-03-02"), time_slots: vec![Slot::Open("14:00".into())] },
            DateEntry { date: day("2030-03-01"), time_slots: vec![
                Slot::Managed { time: "10:00".into(), capacity: 4, booked: 2 },
                Slot::Open("09:00".into()),
            ] },
        ]);

        let rows = SlotRow::from_session(&session);
        assert_eq!(rows.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0, 1, 2]);

        let head = SessionRow { id: session.id.clone(), session_name: session.session_name.clone(), created_at: session.created_at };
        let rebuilt = assemble_sessions(vec![head], rows);
        assert_eq!(rebuilt[0].dates, session.dates);
    }
}
