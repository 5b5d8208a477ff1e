//! Turning calendar text into whatday events.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::lines::{ContentLine, Marker, unfold};
use crate::constants::ICS_SOURCE;
use crate::datetime::{self, Zone};
use crate::error::{WhatDayError, WhatDayResult};
use crate::event::{Category, Event, generate_id};
use crate::storage::Storage;
use crate::store::EventStore;

/// Result of parsing one calendar blob.
#[derive(Debug, Clone, Default)]
pub struct ImportBatch {
    /// New events, in the order their entries appear
    pub events: Vec<Event>,
    /// Number of VEVENT entries seen
    pub entries: usize,
}

impl ImportBatch {
    pub fn count(&self) -> usize {
        self.events.len()
    }

    /// Entries that were malformed or already imported.
    pub fn skipped(&self) -> usize {
        self.entries - self.events.len()
    }
}

/// A parsed DTSTART/DTEND value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcsTime {
    /// `YYYYMMDD`, no time of day
    Date(NaiveDate),
    /// `YYYYMMDDTHHMMSS`, local wall-clock
    Floating(NaiveDateTime),
    /// `YYYYMMDDTHHMMSSZ`
    Utc(DateTime<Utc>),
}

impl IcsTime {
    /// Local wall-clock date and, if there is one, time of day.
    pub fn to_local(self, zone: &Zone) -> (NaiveDate, Option<NaiveTime>) {
        match self {
            IcsTime::Date(d) => (d, None),
            IcsTime::Floating(dt) => (dt.date(), Some(dt.time())),
            IcsTime::Utc(dt) => {
                let local = zone.to_local(dt);
                (local.date(), Some(local.time()))
            }
        }
    }
}

/// Parse calendar text into new events.
///
/// Entries without a title or a readable start are skipped, as are entries
/// whose UID is already in `store` (or on an earlier entry of the same
/// text). Fails only when the text has no VEVENT entries at all.
pub fn parse_calendar<S: Storage>(
    text: &str,
    store: &EventStore<S>,
    zone: &Zone,
) -> WhatDayResult<ImportBatch> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let blocks = vevent_blocks(text);
    if blocks.is_empty() {
        return Err(WhatDayError::NoEventsFound);
    }

    let mut batch = ImportBatch {
        events: Vec::new(),
        entries: blocks.len(),
    };

    for (n, block) in blocks.iter().enumerate() {
        let Some(entry) = Entry::from_lines(block) else {
            tracing::debug!(entry = n, "Skipping calendar entry without title or start");
            continue;
        };

        if let Some(uid) = entry.uid.as_deref() {
            let seen = store.has_ics_uid(uid)
                || batch.events.iter().any(|e| e.ics_uid.as_deref() == Some(uid));
            if seen {
                tracing::debug!(entry = n, uid, "Skipping already imported calendar entry");
                continue;
            }
        }

        match entry.into_event(zone) {
            Some(event) => batch.events.push(event),
            None => tracing::debug!(entry = n, "Skipping calendar entry with unreadable start"),
        }
    }

    Ok(batch)
}

/// The fields whatday reads from one VEVENT.
#[derive(Debug, Default)]
struct Entry {
    summary: String,
    dtstart: String,
    dtend: Option<String>,
    description: Option<String>,
    uid: Option<String>,
}

impl Entry {
    /// First occurrence of each field wins. `None` if title or start is
    /// missing or empty.
    fn from_lines(lines: &[ContentLine]) -> Option<Self> {
        let field = |name: &str| {
            lines
                .iter()
                .find(|l| l.name == name)
                .map(|l| l.value.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tzid = lines
            .iter()
            .find(|l| l.name == "DTSTART")
            .and_then(|l| l.param("TZID"));
        if let Some(tzid) = tzid {
            tracing::debug!(tzid, "Reading DTSTART as local wall-clock time");
        }

        Some(Entry {
            summary: field("SUMMARY")?,
            dtstart: field("DTSTART")?,
            dtend: field("DTEND"),
            description: field("DESCRIPTION"),
            uid: field("UID"),
        })
    }

    fn into_event(self, zone: &Zone) -> Option<Event> {
        let (date, start_time) = parse_timestamp(&self.dtstart)?.to_local(zone);

        // An unreadable end only loses the end time
        let end_time = self
            .dtend
            .as_deref()
            .and_then(parse_timestamp)
            .and_then(|end| end.to_local(zone).1);

        Some(Event {
            id: generate_id(),
            title: unescape_text(&self.summary),
            date: datetime::date_key(date),
            time: start_time.map(datetime::format_clock).unwrap_or_default(),
            end_time: end_time.map(datetime::format_clock),
            category: Category::Other.as_str().to_string(),
            notes: self
                .description
                .as_deref()
                .map(unescape_text)
                .unwrap_or_default(),
            notify: true,
            completed: false,
            created_at: Utc::now(),
            source: Some(ICS_SOURCE.to_string()),
            ics_uid: self.uid,
        })
    }
}

/// Top-level property lines of each VEVENT, in order.
///
/// Lines of nested components (VALARM and friends) are left out so an
/// alarm's DESCRIPTION can't stand in for the event's. An entry missing its
/// `END:VEVENT` runs to the end of the text.
fn vevent_blocks(text: &str) -> Vec<Vec<ContentLine>> {
    let mut blocks = Vec::new();
    let mut current: Option<Vec<ContentLine>> = None;
    let mut nested = 0usize;

    for line in unfold(text).iter().filter_map(|l| ContentLine::parse(l)) {
        match line.component_marker() {
            Some(Marker::Begin { vevent: true }) => {
                if let Some(open) = current.take() {
                    blocks.push(open);
                }
                current = Some(Vec::new());
                nested = 0;
            }
            Some(Marker::End { vevent: true }) => {
                if let Some(open) = current.take() {
                    blocks.push(open);
                }
            }
            Some(Marker::Begin { .. }) if current.is_some() => nested += 1,
            Some(Marker::End { .. }) if current.is_some() => nested = nested.saturating_sub(1),
            _ => {
                if let Some(open) = current.as_mut().filter(|_| nested == 0) {
                    open.push(line);
                }
            }
        }
    }

    if let Some(open) = current {
        blocks.push(open);
    }

    blocks
}

/// Parse a DTSTART/DTEND value.
///
/// Characters other than digits, `T` and `Z` are dropped first, so
/// `2024-01-15T10:00:00Z` reads the same as `20240115T100000Z`. Seconds are
/// optional. Anything else, including out-of-range fields, is `None`.
pub fn parse_timestamp(raw: &str) -> Option<IcsTime> {
    let clean: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'T' || *c == 'Z')
        .collect();

    let (body, utc) = match clean.strip_suffix('Z') {
        Some(body) => (body, true),
        None => (clean.as_str(), false),
    };

    match body.split_once('T') {
        None if !utc => parse_ymd(body).map(IcsTime::Date),
        None => None,
        Some((date, time)) => {
            let local = parse_ymd(date)?.and_time(parse_hms(time)?);
            Some(if utc {
                IcsTime::Utc(local.and_utc())
            } else {
                IcsTime::Floating(local)
            })
        }
    }
}

fn parse_ymd(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(
        s[0..4].parse().ok()?,
        s[4..6].parse().ok()?,
        s[6..8].parse().ok()?,
    )
}

fn parse_hms(s: &str) -> Option<NaiveTime> {
    if !(s.len() == 4 || s.len() == 6) || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let seconds = if s.len() == 6 { s[4..6].parse().ok()? } else { 0 };
    NaiveTime::from_hms_opt(s[0..2].parse().ok()?, s[2..4].parse().ok()?, seconds)
}

/// Undo TEXT escaping: `\n`/`\N`, `\,`, `\;` and `\\`.
///
/// Single left-to-right pass, so `\\n` is a backslash followed by `n`.
/// Unknown escapes are kept as written.
pub fn unescape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use chrono::{FixedOffset, TimeZone};

    fn bangkok() -> Zone {
        Zone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap())
    }

    fn empty_store() -> EventStore<MemoryStorage> {
        EventStore::load(MemoryStorage::new())
    }

    fn store_with(events: Vec<Event>) -> EventStore<MemoryStorage> {
        let mut store = empty_store();
        store.append(events);
        store
    }

    fn parse(text: &str) -> ImportBatch {
        parse_calendar(text, &empty_store(), &bangkok()).expect("Should parse")
    }

    fn calendar(body: &str) -> String {
        format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n{body}END:VCALENDAR\r\n")
    }

    #[test]
    fn test_date_only_start_has_no_time() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nDTSTART;VALUE=DATE:20240115\r\nSUMMARY:Meeting\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.count(), 1);
        let event = &batch.events[0];
        assert_eq!(event.title, "Meeting");
        assert_eq!(event.date, "2024-01-15");
        assert_eq!(event.time, "");
        assert_eq!(event.end_time, None);
    }

    #[test]
    fn test_utc_start_is_converted_to_local() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Call\r\nDTSTART:20240115T100000Z\r\nDTEND:20240115T110000Z\r\nEND:VEVENT\r\n",
        ));

        let event = &batch.events[0];
        assert_eq!(event.date, "2024-01-15");
        assert_eq!(event.time, "17:00");
        assert_eq!(event.end_time.as_deref(), Some("18:00"));
    }

    #[test]
    fn test_utc_conversion_can_move_the_date() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Late\r\nDTSTART:20240115T200000Z\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.events[0].date, "2024-01-16");
        assert_eq!(batch.events[0].time, "03:00");
    }

    #[test]
    fn test_floating_start_is_kept_as_wall_clock() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Yoga\r\nDTSTART;TZID=Europe/Paris:20240115T083000\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.events[0].date, "2024-01-15");
        assert_eq!(batch.events[0].time, "08:30");
    }

    #[test]
    fn test_folded_summary() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Long text \r\n continued text\r\nDTSTART:20240115T090000\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.events[0].title, "Long text continued text");
    }

    #[test]
    fn test_escaped_description() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Notes\r\nDTSTART:20240115\r\nDESCRIPTION:Line1\\nLine2\\,comma\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.events[0].notes, "Line1\nLine2,comma");
    }

    #[test]
    fn test_entry_missing_start_is_skipped() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Valid\r\nDTSTART:20240115T090000\r\nUID:a\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:No start\r\nUID:b\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.entries, 2);
        assert_eq!(batch.count(), 1);
        assert_eq!(batch.skipped(), 1);
        assert_eq!(batch.events[0].title, "Valid");
    }

    #[test]
    fn test_entry_missing_or_empty_title_is_skipped() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nDTSTART:20240115T090000\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:   \r\nDTSTART:20240115T090000\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.entries, 2);
        assert_eq!(batch.count(), 0);
    }

    #[test]
    fn test_unparseable_start_drops_the_entry() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Bad\r\nDTSTART:2024011\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nSUMMARY:Partial\r\nDTSTART:20240115T09\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.count(), 0);
    }

    #[test]
    fn test_unparseable_end_only_drops_the_end_time() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nSUMMARY:Open ended\r\nDTSTART:20240115T090000\r\nDTEND:soon\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.events[0].time, "09:00");
        assert_eq!(batch.events[0].end_time, None);
    }

    #[test]
    fn test_imported_event_defaults() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nUID:evt-1@example.com\r\nSUMMARY:Imported\r\nDTSTART:20240115T090000\r\nEND:VEVENT\r\n",
        ));

        let event = &batch.events[0];
        assert_eq!(event.category, "other");
        assert!(event.notify);
        assert!(!event.completed);
        assert_eq!(event.source.as_deref(), Some("ics"));
        assert_eq!(event.ics_uid.as_deref(), Some("evt-1@example.com"));
        assert_eq!(event.notes, "");
    }

    #[test]
    fn test_known_uid_is_skipped() {
        let text = calendar(
            "BEGIN:VEVENT\r\nUID:known\r\nSUMMARY:Seen\r\nDTSTART:20240115\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nUID:fresh\r\nSUMMARY:New\r\nDTSTART:20240116\r\nEND:VEVENT\r\n",
        );
        let first = parse(&text);
        let known: Vec<Event> = first
            .events
            .into_iter()
            .filter(|e| e.ics_uid.as_deref() == Some("known"))
            .collect();

        let second = parse_calendar(&text, &store_with(known), &bangkok()).unwrap();
        assert_eq!(second.count(), 1);
        assert_eq!(second.events[0].title, "New");
    }

    #[test]
    fn test_duplicate_uid_within_one_calendar() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\nUID:same\r\nSUMMARY:First\r\nDTSTART:20240115\r\nEND:VEVENT\r\n\
             BEGIN:VEVENT\r\nUID:same\r\nSUMMARY:Second\r\nDTSTART:20240116\r\nEND:VEVENT\r\n",
        ));

        assert_eq!(batch.count(), 1);
        assert_eq!(batch.events[0].title, "First");
    }

    #[test]
    fn test_entries_without_uid_are_never_deduplicated() {
        let text = calendar("BEGIN:VEVENT\r\nSUMMARY:Again\r\nDTSTART:20240115\r\nEND:VEVENT\r\n");
        let first = parse(&text);
        let second = parse_calendar(&text, &store_with(first.events), &bangkok()).unwrap();

        assert_eq!(second.count(), 1);
    }

    #[test]
    fn test_other_fields_do_not_confuse_extraction() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\n\
             SUMMARY:Planning\r\n\
             LOCATION:Room 4\\, level 2\r\n\
             X-SUMMARY-NOTE:not the title\r\n\
             DTSTAMP:20231201T000000Z\r\n\
             DTSTART:20240115T090000\r\n\
             ATTENDEE;CN=\"A: B\":mailto:a@example.com\r\n\
             DESCRIPTION:Bring\r\n  laptops\r\n\
             END:VEVENT\r\n",
        ));

        let event = &batch.events[0];
        assert_eq!(event.title, "Planning");
        assert_eq!(event.time, "09:00");
        assert_eq!(event.notes, "Bring laptops");
    }

    #[test]
    fn test_alarm_description_is_not_the_event_description() {
        let batch = parse(&calendar(
            "BEGIN:VEVENT\r\n\
             SUMMARY:Dentist\r\n\
             DTSTART:20240115T090000\r\n\
             BEGIN:VALARM\r\n\
             ACTION:DISPLAY\r\n\
             DESCRIPTION:Reminder\r\n\
             TRIGGER:-PT30M\r\n\
             END:VALARM\r\n\
             END:VEVENT\r\n",
        ));

        assert_eq!(batch.events[0].notes, "");
    }

    #[test]
    fn test_text_without_entries_is_an_error() {
        let result = parse_calendar(&calendar(""), &empty_store(), &bangkok());
        assert!(matches!(result, Err(WhatDayError::NoEventsFound)));

        let result = parse_calendar("<html>Not found</html>", &empty_store(), &bangkok());
        assert!(matches!(result, Err(WhatDayError::NoEventsFound)));
    }

    #[test]
    fn test_leading_byte_order_mark() {
        let batch = parse("\u{FEFF}BEGIN:VEVENT\r\nSUMMARY:Team day\r\nDTSTART:20240115\r\nEND:VEVENT\r\n");

        assert_eq!(batch.count(), 1);
        assert_eq!(batch.events[0].title, "Team day");
    }

    #[test]
    fn test_unterminated_entry_runs_to_end_of_text() {
        let batch = parse("BEGIN:VEVENT\nSUMMARY:Cut off\nDTSTART:20240115");

        assert_eq!(batch.count(), 1);
        assert_eq!(batch.events[0].date, "2024-01-15");
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        assert_eq!(parse_timestamp("20240115"), Some(IcsTime::Date(date)));
        assert_eq!(
            parse_timestamp("20240115T0930"),
            Some(IcsTime::Floating(date.and_hms_opt(9, 30, 0).unwrap()))
        );
        assert_eq!(
            parse_timestamp("2024-01-15T10:00:00Z"),
            Some(IcsTime::Utc(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()))
        );
        assert_eq!(parse_timestamp("20240115Z"), None);
        assert_eq!(parse_timestamp("20241315"), None);
        assert_eq!(parse_timestamp("20240115T256000"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_unescape_text() {
        assert_eq!(unescape_text(r"a\;b\,c\\d\Ne"), "a;b,c\\d\ne");
        assert_eq!(unescape_text(r"C:\\new"), "C:\\new");
        assert_eq!(unescape_text(r"odd\x"), "odd\\x");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }
}
