//! ICS generation for exporting the store.

use chrono::NaiveDate;
use icalendar::{Calendar, Component, Property, ValueType};

use crate::error::{WhatDayError, WhatDayResult};
use crate::event::Event;

/// Generate one calendar containing every event.
///
/// Imported events keep their original UID so that importing the export
/// into the same store adds nothing.
pub fn generate_ics(events: &[Event]) -> WhatDayResult<String> {
    let mut cal = Calendar::new();

    for event in events {
        let date = event.day().ok_or_else(|| {
            WhatDayError::InvalidEvent(format!("event {} has no valid date", event.id))
        })?;

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(event.ics_uid.as_deref().unwrap_or(&event.id));
        ics_event.summary(&event.title);

        if !event.notes.is_empty() {
            ics_event.description(&event.notes);
        }

        match event.start_time() {
            Some(start) => {
                ics_event.add_property("DTSTART", floating(date, start));
                if let Some(end) = event.end_time_of_day() {
                    ics_event.add_property("DTEND", floating(date, end));
                }
            }
            None => {
                add_date_property(&mut ics_event, "DTSTART", date);
                if let Some(next) = date.succ_opt() {
                    add_date_property(&mut ics_event, "DTEND", next);
                }
            }
        }

        ics_event.add_property("CATEGORIES", event.category().as_str().to_uppercase());

        cal.push(ics_event.done());
    }

    Ok(tidy_output(&cal.done().to_string()))
}

fn floating(date: NaiveDate, time: chrono::NaiveTime) -> String {
    date.and_time(time).format("%Y%m%dT%H%M%S").to_string()
}

fn add_date_property(ics_event: &mut icalendar::Event, name: &str, date: NaiveDate) {
    let mut prop = Property::new(name, date.format("%Y%m%d").to_string());
    prop.append_parameter(ValueType::Date);
    ics_event.append_property(prop);
}

/// Replace the icalendar crate's PRODID and drop CALSCALE:GREGORIAN (the default).
fn tidy_output(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:-//whatday//EN\r\n");
            continue;
        }
        if line == "CALSCALE:GREGORIAN" {
            continue;
        }
        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::Zone;
    use crate::event::{Category, EventDraft};
    use crate::ics::parse_calendar;
    use crate::storage::MemoryStorage;
    use crate::store::EventStore;
    use chrono::{FixedOffset, NaiveTime};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn sample_events() -> Vec<Event> {
        let timed = Event::new(
            EventDraft::new("Design review", day())
                .at(NaiveTime::from_hms_opt(15, 0, 0).unwrap())
                .until(NaiveTime::from_hms_opt(16, 0, 0).unwrap())
                .category(Category::Meeting)
                .notes("Bring the mockups"),
        )
        .unwrap();
        let untimed = Event::new(EventDraft::new("Pay rent", day())).unwrap();
        vec![timed, untimed]
    }

    #[test]
    fn test_untimed_event_has_value_date() {
        let ics = generate_ics(&sample_events()).unwrap();

        assert!(
            ics.contains("DTSTART;VALUE=DATE:20240320"),
            "DTSTART should have VALUE=DATE parameter. ICS:\n{}",
            ics
        );
        assert!(ics.contains("DTEND;VALUE=DATE:20240321"));
        assert!(ics.contains("DTSTART:20240320T150000"));
        assert!(ics.contains("PRODID:-//whatday//EN"));
        assert!(!ics.contains("CALSCALE"));
    }

    #[test]
    fn test_export_can_be_imported_again() {
        let events = sample_events();
        let ics = generate_ics(&events).unwrap();
        let zone = Zone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap());

        let mut store = EventStore::load(MemoryStorage::new());
        let batch = parse_calendar(&ics, &store, &zone).expect("Should parse export");
        assert_eq!(batch.count(), 2);
        assert_eq!(batch.events[0].title, "Design review");
        assert_eq!(batch.events[0].date, "2024-03-20");
        assert_eq!(batch.events[0].time, "15:00");
        assert_eq!(batch.events[0].end_time.as_deref(), Some("16:00"));
        assert_eq!(batch.events[0].notes, "Bring the mockups");
        assert_eq!(batch.events[1].time, "");

        // Exported UIDs are the original event ids, now stored as icsUid
        store.append(batch.events);
        let again = parse_calendar(&ics, &store, &zone).unwrap();
        assert_eq!(again.count(), 0);
    }
}
