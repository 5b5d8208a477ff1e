//! The whatday root: configuration plus the data directory it points at.

use std::path::PathBuf;

use chrono::TimeDelta;
use config::{Config, File};

use crate::datetime::{Locale, Zone};
use crate::error::{WhatDayError, WhatDayResult};
use crate::storage::FileStorage;
use crate::whatday_config::WhatDayConfig;

#[derive(Clone)]
pub struct WhatDay {
    config: WhatDayConfig,
}

impl WhatDay {
    /// Load ~/.config/whatday/config.toml, creating a commented default
    /// file on first run.
    pub fn load() -> WhatDayResult<Self> {
        let config_path = WhatDayConfig::config_path()?;

        if !config_path.exists() {
            WhatDayConfig::create_default_config(&config_path)?;
        }

        let config: WhatDayConfig = Config::builder()
            .add_source(File::from(config_path).required(false))
            .build()
            .map_err(|e| WhatDayError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| WhatDayError::Config(e.to_string()))?;

        Ok(WhatDay { config })
    }

    pub fn from_config(config: WhatDayConfig) -> Self {
        WhatDay { config }
    }

    pub fn data_path(&self) -> PathBuf {
        let full_path_str =
            shellexpand::tilde(&self.config.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    pub fn storage(&self) -> FileStorage {
        FileStorage::new(self.data_path())
    }

    pub fn locale(&self) -> Locale {
        self.config.locale
    }

    pub fn zone(&self) -> WhatDayResult<Zone> {
        self.config.timezone.parse()
    }

    /// The relay prefix for remote imports, `None` to fetch directly.
    pub fn import_relay(&self) -> Option<&str> {
        let relay = self.config.import_relay.trim();
        (!relay.is_empty()).then_some(relay)
    }

    pub fn speech_command(&self) -> Option<&str> {
        self.config.speech_command.as_deref()
    }

    /// How long before a timed event its reminder fires, at most a day.
    pub fn reminder_lead(&self) -> WhatDayResult<TimeDelta> {
        let minutes = self.config.reminder_lead_minutes;
        TimeDelta::try_minutes(minutes)
            .filter(|lead| *lead >= TimeDelta::zero() && *lead <= TimeDelta::days(1))
            .ok_or_else(|| {
                WhatDayError::Config(format!(
                    "reminder_lead_minutes must be between 0 and 1440, got {minutes}"
                ))
            })
    }

    /// How often the notifier looks for changes, at most a day.
    pub fn poll_interval(&self) -> WhatDayResult<TimeDelta> {
        let raw = &self.config.poll_interval;
        let interval = humantime::parse_duration(raw)
            .map_err(|e| WhatDayError::Config(format!("Invalid poll_interval '{raw}': {e}")))?;

        TimeDelta::from_std(interval)
            .ok()
            .filter(|poll| *poll > TimeDelta::zero() && *poll <= TimeDelta::days(1))
            .ok_or_else(|| {
                WhatDayError::Config(format!(
                    "poll_interval must be more than zero and at most a day, got '{raw}'"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_accessors_follow_config() {
        let whatday = WhatDay::from_config(WhatDayConfig {
            data_dir: PathBuf::from("/tmp/whatday-data"),
            timezone: "+07:00".into(),
            import_relay: "  ".into(),
            reminder_lead_minutes: 10,
            poll_interval: "2m".into(),
            ..WhatDayConfig::default()
        });

        assert_eq!(whatday.data_path(), PathBuf::from("/tmp/whatday-data"));
        assert_eq!(
            whatday.zone().unwrap(),
            Zone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap())
        );
        assert_eq!(whatday.import_relay(), None);
        assert_eq!(whatday.reminder_lead().unwrap(), TimeDelta::minutes(10));
        assert_eq!(whatday.poll_interval().unwrap(), TimeDelta::minutes(2));
    }

    #[test]
    fn test_defaults() {
        let whatday = WhatDay::from_config(WhatDayConfig::default());

        assert_eq!(whatday.zone().unwrap(), Zone::System);
        assert_eq!(whatday.locale(), Locale::Thai);
        assert!(whatday.import_relay().is_some());
        assert_eq!(whatday.poll_interval().unwrap(), TimeDelta::seconds(30));
        assert_eq!(whatday.reminder_lead().unwrap(), TimeDelta::minutes(15));
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let whatday = WhatDay::from_config(WhatDayConfig {
            timezone: "Mars/Olympus".into(),
            poll_interval: "soon".into(),
            ..WhatDayConfig::default()
        });

        assert!(matches!(whatday.zone(), Err(WhatDayError::Config(_))));
        assert!(matches!(whatday.poll_interval(), Err(WhatDayError::Config(_))));
    }

    #[test]
    fn test_extreme_durations_are_config_errors() {
        let whatday = WhatDay::from_config(WhatDayConfig {
            reminder_lead_minutes: i64::MAX,
            poll_interval: "500000000years".into(),
            ..WhatDayConfig::default()
        });
        assert!(matches!(whatday.reminder_lead(), Err(WhatDayError::Config(_))));
        assert!(matches!(whatday.poll_interval(), Err(WhatDayError::Config(_))));

        let whatday = WhatDay::from_config(WhatDayConfig {
            reminder_lead_minutes: -5,
            poll_interval: "0s".into(),
            ..WhatDayConfig::default()
        });
        assert!(matches!(whatday.reminder_lead(), Err(WhatDayError::Config(_))));
        assert!(matches!(whatday.poll_interval(), Err(WhatDayError::Config(_))));
    }
}
