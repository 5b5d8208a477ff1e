//! Date keys, clock strings, locale labels and local time zones.
//!
//! Events are keyed by a `YYYY-MM-DD` date string and carry `HH:MM` wall-clock
//! strings. Everything that turns those into something a person reads (or
//! hears) goes through a [`Locale`], and everything that turns an instant into
//! wall-clock terms goes through a [`Zone`].

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
    Weekday,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{WhatDayError, WhatDayResult};

const THAI_DAYS: [&str; 7] = [
    "อาทิตย์",
    "จันทร์",
    "อังคาร",
    "พุธ",
    "พฤหัสบดี",
    "ศุกร์",
    "เสาร์",
];

const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Offset between the Gregorian and the Thai Buddhist calendar year.
const BUDDHIST_ERA_OFFSET: i32 = 543;

/// Format a date as its storage key (`YYYY-MM-DD`).
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date key.
pub fn parse_date_key(s: &str) -> WhatDayResult<NaiveDate> {
    let s = s.trim();
    // chrono accepts unpadded fields, keys are always zero-padded
    if s.len() != 10 {
        return Err(WhatDayError::InvalidDate(s.to_string()));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| WhatDayError::InvalidDate(s.to_string()))
}

/// Parse an `HH:MM` wall-clock string.
pub fn parse_clock(s: &str) -> WhatDayResult<NaiveTime> {
    let s = s.trim();
    if s.len() != 5 {
        return Err(WhatDayError::InvalidTime(s.to_string()));
    }
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| WhatDayError::InvalidTime(s.to_string()))
}

/// Format a wall-clock time as `HH:MM`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Shorten a stored time string for display (`"09:30:00"` -> `"09:30"`).
pub fn display_clock(time: &str) -> &str {
    time.get(..5).unwrap_or(time)
}

/// Language used for labels, status lines and spoken summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "th")]
    Thai,
    #[serde(rename = "en")]
    English,
}

impl Locale {
    /// Name of the weekday, e.g. "วันจันทร์" or "Monday".
    pub fn day_label(&self, date: NaiveDate) -> String {
        match self {
            Locale::Thai => {
                let idx = date.weekday().num_days_from_sunday() as usize;
                format!("วัน{}", THAI_DAYS[idx])
            }
            Locale::English => english_weekday(date.weekday()).to_string(),
        }
    }

    /// Full date, e.g. "15 มกราคม 2567" (Buddhist year) or "15 January 2024".
    pub fn date_label(&self, date: NaiveDate) -> String {
        match self {
            Locale::Thai => format!(
                "{} {} {}",
                date.day(),
                THAI_MONTHS[date.month0() as usize],
                date.year() + BUDDHIST_ERA_OFFSET
            ),
            Locale::English => date.format("%-d %B %Y").to_string(),
        }
    }

    pub fn today_suffix(&self) -> &'static str {
        match self {
            Locale::Thai => "(วันนี้)",
            Locale::English => "(today)",
        }
    }

    /// BCP 47 language tag, used to pick a voice.
    pub fn language_tag(&self) -> &'static str {
        match self {
            Locale::Thai => "th",
            Locale::English => "en",
        }
    }
}

impl FromStr for Locale {
    type Err = WhatDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "th" | "thai" => Ok(Locale::Thai),
            "en" | "english" => Ok(Locale::English),
            other => Err(WhatDayError::Config(format!(
                "Unknown locale '{other}'. Expected 'th' or 'en'"
            ))),
        }
    }
}

fn english_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// The time zone that "local wall-clock" refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// Whatever the operating system reports.
    #[default]
    System,
    /// An IANA zone, e.g. `Asia/Bangkok`.
    Named(Tz),
    /// A fixed offset from UTC, e.g. `+07:00`.
    Fixed(FixedOffset),
}

impl Zone {
    /// Wall-clock date and time of an instant in this zone.
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Zone::System => instant.with_timezone(&Local).naive_local(),
            Zone::Named(tz) => instant.with_timezone(tz).naive_local(),
            Zone::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// The instant a wall-clock time refers to. Ambiguous times (DST fold)
    /// resolve to the earlier instant, skipped times (DST gap) to `None`.
    pub fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::System => Local
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        self.to_local(now).date()
    }
}

impl FromStr for Zone {
    type Err = WhatDayError;

    /// Accepts `local`, an IANA zone name, or an offset like `+07:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("local") {
            return Ok(Zone::System);
        }
        if s.starts_with('+') || s.starts_with('-') {
            return parse_offset(s)
                .map(Zone::Fixed)
                .ok_or_else(|| WhatDayError::Config(format!("Invalid UTC offset '{s}'")));
        }
        s.parse::<Tz>()
            .map(Zone::Named)
            .map_err(|_| WhatDayError::Config(format!("Unknown time zone '{s}'")))
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Zone::System => write!(f, "local"),
            Zone::Named(tz) => write!(f, "{}", tz.name()),
            Zone::Fixed(offset) => write!(f, "{offset}"),
        }
    }
}

/// Parse `+HH:MM`, `+HHMM` or `+HH` (and the `-` forms).
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 14 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
