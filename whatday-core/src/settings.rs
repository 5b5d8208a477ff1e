//! Notification and voice settings.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::constants::SETTINGS_KEY;
use crate::datetime;
use crate::error::WhatDayResult;
use crate::storage::Storage;

/// The persisted settings record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Morning notification with the number of open events
    pub daily_summary: bool,
    /// Reminder shortly before each timed event
    pub before_event: bool,
    /// Read the day aloud when the morning summary fires
    pub auto_voice: bool,
    /// `HH:MM`
    pub morning_time: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            daily_summary: true,
            before_event: true,
            auto_voice: false,
            morning_time: "07:00".to_string(),
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults when the record is missing or
    /// unreadable. Fields missing from the stored record keep their defaults.
    pub fn load<S: Storage>(storage: &S) -> Self {
        match storage.read_json::<Settings>(SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::warn!("Could not load settings, using defaults: {e}");
                Settings::default()
            }
        }
    }

    pub fn save<S: Storage>(&self, storage: &S) -> WhatDayResult<()> {
        datetime::parse_clock(&self.morning_time)?;
        storage.write_json(SETTINGS_KEY, self)
    }

    pub fn morning_time(&self) -> Option<NaiveTime> {
        datetime::parse_clock(&self.morning_time).ok()
    }
}
