//! The event record and its display categories.
//!
//! An [`Event`] is the only thing whatday persists. The JSON shape (camelCase
//! field names, `endTime: null` when there is no end) is the storage format,
//! so changes here are storage format changes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::ICS_SOURCE;
use crate::datetime::{self, Locale};
use crate::error::{WhatDayError, WhatDayResult};

/// A single dated task or appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    /// Day key, `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`, or empty for an event without a time of day
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub end_time: Option<String>,
    /// Stored verbatim; see [`Event::category`] for the display value
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_true")]
    pub notify: bool,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ics_uid: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_category() -> String {
    Category::Other.as_str().to_string()
}

impl Event {
    /// Create a new event from user-entered fields.
    pub fn new(draft: EventDraft) -> WhatDayResult<Self> {
        draft.validate()?;

        Ok(Event {
            id: generate_id(),
            title: draft.title.trim().to_string(),
            date: draft.date,
            time: draft.time,
            end_time: draft.end_time.filter(|t| !t.is_empty()),
            category: draft.category,
            notes: draft.notes.trim().to_string(),
            notify: draft.notify,
            completed: false,
            created_at: Utc::now(),
            source: None,
            ics_uid: None,
        })
    }

    /// Display category; unknown stored values show as [`Category::Other`].
    pub fn category(&self) -> Category {
        self.category.parse().unwrap_or(Category::Other)
    }

    pub fn day(&self) -> Option<NaiveDate> {
        datetime::parse_date_key(&self.date).ok()
    }

    /// Start time of day, `None` for untimed events or unreadable values.
    pub fn start_time(&self) -> Option<NaiveTime> {
        if self.time.is_empty() {
            return None;
        }
        datetime::parse_clock(datetime::display_clock(&self.time)).ok()
    }

    pub fn end_time_of_day(&self) -> Option<NaiveTime> {
        let end = self.end_time.as_deref()?;
        datetime::parse_clock(datetime::display_clock(end)).ok()
    }

    /// Local wall-clock start, for timed events only.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        Some(self.day()?.and_time(self.start_time()?))
    }

    /// Created by a calendar import, with or without a UID.
    pub fn is_imported(&self) -> bool {
        self.source.as_deref() == Some(ICS_SOURCE)
    }

    /// Apply a partial update. `id` and `created_at` never change.
    pub fn apply(&mut self, patch: EventPatch) -> WhatDayResult<()> {
        let mut updated = self.clone();

        if let Some(title) = patch.title {
            updated.title = title.trim().to_string();
        }
        if let Some(date) = patch.date {
            updated.date = date;
        }
        if let Some(time) = patch.time {
            updated.time = time;
        }
        if let Some(end_time) = patch.end_time {
            updated.end_time = end_time.filter(|t| !t.is_empty());
        }
        if let Some(category) = patch.category {
            updated.category = category;
        }
        if let Some(notes) = patch.notes {
            updated.notes = notes.trim().to_string();
        }
        if let Some(notify) = patch.notify {
            updated.notify = notify;
        }
        if let Some(completed) = patch.completed {
            updated.completed = completed;
        }

        validate_fields(
            &updated.title,
            &updated.date,
            &updated.time,
            updated.end_time.as_deref(),
        )?;

        *self = updated;
        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Opaque, locally generated event id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fields for a manually created event.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    pub time: String,
    pub end_time: Option<String>,
    pub category: String,
    pub notes: String,
    pub notify: bool,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        EventDraft {
            title: title.into(),
            date: datetime::date_key(date),
            time: String::new(),
            end_time: None,
            category: Category::Other.as_str().to_string(),
            notes: String::new(),
            notify: true,
        }
    }

    pub fn at(mut self, time: NaiveTime) -> Self {
        self.time = datetime::format_clock(time);
        self
    }

    pub fn until(mut self, end: NaiveTime) -> Self {
        self.end_time = Some(datetime::format_clock(end));
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category.as_str().to_string();
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    fn validate(&self) -> WhatDayResult<()> {
        validate_fields(&self.title, &self.date, &self.time, self.end_time.as_deref())
    }
}

/// A partial update; `None` leaves a field as it is.
///
/// `end_time` is doubly optional: `Some(None)` clears the end time.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub end_time: Option<Option<String>>,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub notify: Option<bool>,
    pub completed: Option<bool>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.end_time.is_none()
            && self.category.is_none()
            && self.notes.is_none()
            && self.notify.is_none()
            && self.completed.is_none()
    }
}

fn validate_fields(
    title: &str,
    date: &str,
    time: &str,
    end_time: Option<&str>,
) -> WhatDayResult<()> {
    if title.trim().is_empty() {
        return Err(WhatDayError::InvalidEvent("title must not be empty".into()));
    }
    datetime::parse_date_key(date)?;
    if !time.is_empty() {
        datetime::parse_clock(time)?;
    }
    if let Some(end) = end_time.filter(|t| !t.is_empty()) {
        datetime::parse_clock(end)?;
    }
    Ok(())
}

/// Display categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Work,
    Personal,
    Health,
    Study,
    Meeting,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Work,
        Category::Personal,
        Category::Health,
        Category::Study,
        Category::Meeting,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Study => "study",
            Category::Meeting => "meeting",
            Category::Other => "other",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::Thai, Category::Work) => "💼 งาน",
            (Locale::Thai, Category::Personal) => "👤 ส่วนตัว",
            (Locale::Thai, Category::Health) => "💪 สุขภาพ",
            (Locale::Thai, Category::Study) => "📚 การเรียน",
            (Locale::Thai, Category::Meeting) => "🤝 ประชุม",
            (Locale::Thai, Category::Other) => "📌 อื่นๆ",
            (Locale::English, Category::Work) => "💼 Work",
            (Locale::English, Category::Personal) => "👤 Personal",
            (Locale::English, Category::Health) => "💪 Health",
            (Locale::English, Category::Study) => "📚 Study",
            (Locale::English, Category::Meeting) => "🤝 Meeting",
            (Locale::English, Category::Other) => "📌 Other",
        }
    }
}

impl FromStr for Category {
    type Err = WhatDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| WhatDayError::InvalidEvent(format!("unknown category '{s}'")))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_new_event_defaults() {
        let event = Event::new(EventDraft::new("  Dentist ", day())).unwrap();

        assert_eq!(event.title, "Dentist");
        assert_eq!(event.date, "2024-01-15");
        assert_eq!(event.time, "");
        assert_eq!(event.category(), Category::Other);
        assert!(event.notify);
        assert!(!event.completed);
        assert!(event.source.is_none());
        assert!(!event.is_imported());
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let err = Event::new(EventDraft::new("   ", day())).unwrap_err();
        assert!(matches!(err, WhatDayError::InvalidEvent(_)));
    }

    #[test]
    fn test_unknown_category_is_stored_verbatim_but_displays_as_other() {
        let mut draft = EventDraft::new("Gym", day());
        draft.category = "fitness".to_string();
        let event = Event::new(draft).unwrap();

        assert_eq!(event.category, "fitness");
        assert_eq!(event.category(), Category::Other);
    }

    #[test]
    fn test_json_shape_is_camel_case() {
        let time = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let event = Event::new(EventDraft::new("Standup", day()).at(time)).unwrap();
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["time"], "09:00");
        assert!(json["endTime"].is_null());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("icsUid").is_none(), "absent for manual events");
    }

    #[test]
    fn test_missing_notify_defaults_to_true() {
        let json = r#"{
            "id": "abc",
            "title": "Old record",
            "date": "2024-01-15",
            "createdAt": "2024-01-01T00:00:00Z"
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();

        assert!(event.notify);
        assert!(!event.completed);
        assert_eq!(event.category, "other");
    }

    #[test]
    fn test_apply_patch_keeps_identity() {
        let mut event = Event::new(EventDraft::new("Draft", day())).unwrap();
        let id = event.id.clone();
        let created_at = event.created_at;

        event
            .apply(EventPatch {
                title: Some("Final".into()),
                time: Some("10:30".into()),
                end_time: Some(Some("11:00".into())),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(event.id, id);
        assert_eq!(event.created_at, created_at);
        assert_eq!(event.title, "Final");
        assert_eq!(event.time, "10:30");
        assert_eq!(event.end_time.as_deref(), Some("11:00"));

        event
            .apply(EventPatch {
                end_time: Some(None),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(event.end_time, None);
    }

    #[test]
    fn test_invalid_patch_leaves_event_untouched() {
        let mut event = Event::new(EventDraft::new("Keep", day())).unwrap();
        let before = event.clone();

        let result = event.apply(EventPatch {
            title: Some("Changed".into()),
            date: Some("2024-13-01".into()),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(event, before);
    }

    #[test]
    fn test_starts_at() {
        let time = NaiveTime::from_hms_opt(14, 15, 0).unwrap();
        let timed = Event::new(EventDraft::new("Call", day()).at(time)).unwrap();
        let untimed = Event::new(EventDraft::new("Errand", day())).unwrap();

        assert_eq!(timed.starts_at(), Some(day().and_time(time)));
        assert_eq!(untimed.starts_at(), None);
    }

    #[test]
    fn test_imported_is_decided_by_source() {
        let mut event = Event::new(EventDraft::new("Holiday", day())).unwrap();
        event.source = Some("ics".into());
        assert!(event.is_imported());

        event.source = None;
        event.ics_uid = Some("uid-1".into());
        assert!(!event.is_imported());
    }
}
