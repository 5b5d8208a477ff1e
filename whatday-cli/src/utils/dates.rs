//! Parsing dates and times typed on the command line.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use whatday_core::datetime;

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    const ABBREVIATIONS: &[(&str, &str)] = &[
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map_or(word, |(_, full)| *full)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// A day given as `YYYY-MM-DD`, a word relative to `today`, or anything
/// fuzzydate understands ("next friday", "march 20").
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();

    if let Ok(date) = datetime::parse_date_key(input) {
        return Ok(date);
    }

    match input.to_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + TimeDelta::days(1)),
        "yesterday" => return Ok(today - TimeDelta::days(1)),
        _ => {}
    }

    let expanded = expand_abbreviations(input);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow!("Could not parse date: \"{}\"", input))?;
    Ok(dt.date())
}

/// A time of day given as `HH:MM`, `H:MM` or `3pm`.
pub fn parse_time(input: &str) -> Result<NaiveTime> {
    let input = input.trim();

    for format in ["%H:%M", "%H.%M"] {
        if let Ok(time) = NaiveTime::parse_from_str(input, format) {
            return Ok(time);
        }
    }

    if !looks_like_time(input) {
        return Err(anyhow!("Could not parse time: \"{}\". Expected HH:MM", input));
    }

    // fuzzydate needs a day in front of a bare time
    let dt = fuzzydate::parse(&format!("tomorrow {}", input.to_lowercase()))
        .map_err(|_| anyhow!("Could not parse time: \"{}\". Expected HH:MM", input))?;
    Ok(dt.time())
}

/// End of an event: a time of day, or a duration after `start` ("45m", "2h").
pub fn parse_end(input: &str, start: NaiveTime) -> Result<NaiveTime> {
    if let Ok(time) = parse_time(input) {
        return Ok(time);
    }

    let std_dur = humantime::parse_duration(input.trim())
        .with_context(|| format!("Could not parse end time or duration: \"{}\"", input))?;
    let duration = TimeDelta::from_std(std_dur).context("Duration too large")?;

    let (end, wrapped) = start.overflowing_add_signed(duration);
    if wrapped != 0 {
        return Err(anyhow!("Events can't run past midnight"));
    }
    Ok(end)
}

/// Digits followed by am/pm, or the words noon and midnight.
fn looks_like_time(input: &str) -> bool {
    let lower = input.to_lowercase();
    if lower == "noon" || lower == "midnight" {
        return true;
    }

    let Some(number) = lower
        .strip_suffix("am")
        .or_else(|| lower.strip_suffix("pm"))
        .map(str::trim)
    else {
        return false;
    };
    !number.is_empty() && number.chars().all(|c| c.is_ascii_digit() || c == ':')
}
