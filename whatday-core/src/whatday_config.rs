//! Global whatday configuration.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants::{DEFAULT_IMPORT_RELAY, DEFAULT_REMINDER_LEAD_MINUTES};
use crate::datetime::Locale;
use crate::error::{WhatDayError, WhatDayResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/whatday";
static DEFAULT_POLL_INTERVAL: &str = "30s";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_timezone() -> String {
    "local".to_string()
}

fn default_import_relay() -> String {
    DEFAULT_IMPORT_RELAY.to_string()
}

fn default_reminder_lead_minutes() -> i64 {
    DEFAULT_REMINDER_LEAD_MINUTES
}

fn default_poll_interval() -> String {
    DEFAULT_POLL_INTERVAL.to_string()
}

/// Global configuration at ~/.config/whatday/config.toml
///
/// Notification settings (morning time, voice) are user data and live in the
/// data directory instead, next to the events.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WhatDayConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub locale: Locale,

    /// `local`, an IANA zone name, or a UTC offset such as `+07:00`
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Prefix for fetching remote calendars; empty fetches directly.
    #[serde(default = "default_import_relay")]
    pub import_relay: String,

    #[serde(default)]
    pub speech_command: Option<String>,

    #[serde(default = "default_reminder_lead_minutes")]
    pub reminder_lead_minutes: i64,

    /// How often the notifier looks for changes, e.g. `30s` or `2m`.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
}

impl Default for WhatDayConfig {
    fn default() -> Self {
        WhatDayConfig {
            data_dir: default_data_dir(),
            locale: Locale::default(),
            timezone: default_timezone(),
            import_relay: default_import_relay(),
            speech_command: None,
            reminder_lead_minutes: default_reminder_lead_minutes(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl WhatDayConfig {
    pub fn config_path() -> WhatDayResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| WhatDayError::Config("Could not determine config directory".into()))?
            .join("whatday");

        Ok(config_dir.join("config.toml"))
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> WhatDayResult<()> {
        let contents = format!(
            "\
# whatday configuration

# Where events and notification settings are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Language for labels, notifications and speech (\"th\" or \"en\"):
# locale = \"th\"

# Time zone for event times: \"local\", an IANA name, or an offset like \"+07:00\":
# timezone = \"local\"

# Prefix added in front of calendar URLs when importing. Set to \"\" to fetch directly:
# import_relay = \"{DEFAULT_IMPORT_RELAY}\"

# Text-to-speech program, the text is passed as the last argument.
# Defaults to the first of espeak-ng, espeak, spd-say or say found on PATH:
# speech_command = \"espeak-ng -v th\"

# Minutes before a timed event that its reminder fires:
# reminder_lead_minutes = {DEFAULT_REMINDER_LEAD_MINUTES}

# How often whatday-notify checks for changed events:
# poll_interval = \"{DEFAULT_POLL_INTERVAL}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                WhatDayError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| WhatDayError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: WhatDayConfig = toml::from_str("").unwrap();
        assert_eq!(config, WhatDayConfig::default());
        assert_eq!(config.reminder_lead_minutes, 15);
        assert_eq!(config.import_relay, "https://api.allorigins.win/raw?url=");
    }

    #[test]
    fn test_default_file_is_all_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("whatday").join("config.toml");

        WhatDayConfig::create_default_config(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let config: WhatDayConfig = toml::from_str(&text).unwrap();
        assert_eq!(config, WhatDayConfig::default());
    }
}
