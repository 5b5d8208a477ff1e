/// Storage key for the event list.
pub const EVENTS_KEY: &str = "whatday_events";

/// Storage key for the notification settings record.
pub const SETTINGS_KEY: &str = "whatday_settings";

/// Storage key for the last URL a calendar was imported from.
pub const ICS_URL_KEY: &str = "whatday_ics_url";

/// Minutes before a timed event that its reminder fires.
pub const DEFAULT_REMINDER_LEAD_MINUTES: i64 = 15;

/// Relay used to fetch calendar feeds that don't allow direct access.
pub const DEFAULT_IMPORT_RELAY: &str = "https://api.allorigins.win/raw?url=";

/// `source` tag for events created by a calendar import.
pub const ICS_SOURCE: &str = "ics";
