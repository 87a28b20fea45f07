//! Planner event record.
//!
//! Events are stored in the planner's JSON array file. Dates are written in
//! the planner's human form (`Sun Oct 18 2026`) and read back from either that
//! form or ISO `YYYY-MM-DD`; times are `HH:MM`.

use super::{normalize_title, Record, ValidationError};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque event identity.
pub type EventId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    #[serde(with = "planner_date")]
    pub date: NaiveDate,
    #[serde(with = "wall_time")]
    pub time: NaiveTime,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Replacement values for an event edit. The date is not editable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventChanges {
    pub time: NaiveTime,
    pub title: String,
    pub description: Option<String>,
}

impl Event {
    pub fn new(date: NaiveDate, time: NaiveTime, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            time,
            title: title.into().trim().to_string(),
            description: None,
        }
    }

    /// Sets the description; blank text clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = normalize_description(Some(description.into()));
        self
    }

    /// Local date and time combined.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Planner-form date label, e.g. `Sun Oct 18 2026`.
    pub fn date_label(&self) -> String {
        planner_date::format(self.date)
    }
}

impl Record for Event {
    type Changes = EventChanges;

    const KIND: &'static str = "event";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate(&self) -> Result<(), ValidationError> {
        normalize_title(&self.title).map(|_| ())
    }

    fn apply_changes(&mut self, changes: EventChanges) -> Result<(), ValidationError> {
        let title = normalize_title(&changes.title)?;
        self.title = title;
        self.time = changes.time;
        self.description = normalize_description(changes.description);
        Ok(())
    }
}

fn normalize_description(description: Option<String>) -> Option<String> {
    description.filter(|text| !text.trim().is_empty())
}

/// Parses `HH:MM` (or `HH:MM:SS`) wall-clock input.
pub fn parse_wall_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// Parses a planner date in either `Sun Oct 18 2026` or `2026-10-18` form.
pub fn parse_planner_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, planner_date::FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .ok()
}

pub(crate) mod planner_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%a %b %d %Y";

    pub fn format(date: NaiveDate) -> String {
        date.format(FORMAT).to_string()
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_planner_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid event date `{raw}`")))
    }
}

mod wall_time {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_wall_time(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid event time `{raw}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_planner_date, Event, EventChanges};
    use crate::model::Record;
    use chrono::{NaiveDate, NaiveTime};

    fn oct(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn wire_format_matches_planner_file() {
        let mut event = Event::new(oct(1), hm(9, 0), "Open shop");
        event.id = "1760000000000".to_string();

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["date"], "Thu Oct 01 2026");
        assert_eq!(json["time"], "09:00");
        assert!(json.get("description").is_none());

        let decoded: Event = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn iso_dates_are_accepted_when_reading() {
        assert_eq!(parse_planner_date("2026-10-18"), Some(oct(18)));
        assert_eq!(parse_planner_date("Sun Oct 18 2026"), Some(oct(18)));
        assert_eq!(parse_planner_date("someday"), None);
        assert_eq!(Event::new(oct(18), hm(9, 0), "x").date_label(), "Sun Oct 18 2026");
    }

    #[test]
    fn edit_keeps_identity_and_date() {
        let mut event = Event::new(oct(18), hm(9, 0), "Stock count").with_description("back room");
        let id = event.id.clone();

        event
            .apply_changes(EventChanges {
                time: hm(14, 30),
                title: "Inventory".to_string(),
                description: Some(" ".to_string()),
            })
            .unwrap();

        assert_eq!(event.id, id);
        assert_eq!(event.date, oct(18));
        assert_eq!(event.time, hm(14, 30));
        assert_eq!(event.description, None);
    }
}
