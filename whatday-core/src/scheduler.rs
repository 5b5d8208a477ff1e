//! Reminder planning.
//!
//! Reminders are never updated in place. Whenever events or settings change,
//! the caller plans the whole day again and hands the result to
//! [`Scheduler::reschedule`], which drops everything that was pending before.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::datetime::{self, Locale, Zone};
use crate::event::Event;
use crate::settings::Settings;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut current) = self.now.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// What to tell the user when a timer fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reminder {
    /// Shortly before a timed event.
    BeforeEvent {
        event_id: String,
        title: String,
        /// `HH:MM`
        time: String,
        notes: String,
    },
    /// Morning summary of a day. The open count is taken when it fires.
    DailySummary { date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub due: DateTime<Utc>,
    pub reminder: Reminder,
}

/// A rendered desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn before_event(
        title: &str,
        time: &str,
        notes: &str,
        lead: TimeDelta,
        locale: Locale,
    ) -> Self {
        let minutes = lead.num_minutes();
        let time = datetime::display_clock(time);

        let (title, mut body) = match locale {
            Locale::Thai => (
                format!("⏰ อีก {minutes} นาที: {title}"),
                format!("เวลา {time}"),
            ),
            Locale::English => (
                format!("⏰ In {minutes} minutes: {title}"),
                format!("At {time}"),
            ),
        };
        if !notes.is_empty() {
            body.push_str(" — ");
            body.push_str(notes);
        }

        Notification { title, body }
    }

    pub fn daily_summary(remaining: usize, locale: Locale) -> Self {
        match locale {
            Locale::Thai => Notification {
                title: "🌅 สรุปกิจกรรมวันนี้".to_string(),
                body: format!("คุณมี {remaining} กิจกรรมที่ต้องทำวันนี้"),
            },
            Locale::English => Notification {
                title: "🌅 Today's summary".to_string(),
                body: format!(
                    "You have {remaining} {} to do today",
                    if remaining == 1 { "event" } else { "events" }
                ),
            },
        }
    }
}

/// Plan today's reminders.
///
/// Only instants strictly after `now` are kept; "today" is the local date of
/// `now` in `zone`.
pub fn plan(
    events: &[Event],
    settings: &Settings,
    now: DateTime<Utc>,
    zone: &Zone,
    lead: TimeDelta,
) -> Vec<PendingTimer> {
    let today = zone.today(now);
    let today_key = datetime::date_key(today);
    let mut timers = Vec::new();

    if settings.before_event {
        let candidates = events
            .iter()
            .filter(|e| e.date == today_key && !e.completed && e.notify);

        for event in candidates {
            let Some(start) = event.starts_at() else {
                continue;
            };
            let Some(start) = zone.from_local(start) else {
                tracing::debug!(event = %event.id, "Start time does not exist in zone");
                continue;
            };
            let Some(due) = start.checked_sub_signed(lead) else {
                continue;
            };
            if due <= now {
                continue;
            }

            timers.push(PendingTimer {
                due,
                reminder: Reminder::BeforeEvent {
                    event_id: event.id.clone(),
                    title: event.title.clone(),
                    time: event.time.clone(),
                    notes: event.notes.clone(),
                },
            });
        }
    }

    if settings.daily_summary {
        let due = settings
            .morning_time()
            .and_then(|time| zone.from_local(today.and_time(time)));

        match due {
            Some(due) if due > now => timers.push(PendingTimer {
                due,
                reminder: Reminder::DailySummary { date: today },
            }),
            Some(_) => {}
            None => tracing::warn!(
                morning_time = %settings.morning_time,
                "Skipping daily summary, morning time is not usable"
            ),
        }
    }

    timers.sort_by_key(|t| t.due);
    timers
}

/// Start of the next local day, when the plan has to be made again.
pub fn next_midnight(now: DateTime<Utc>, zone: &Zone) -> Option<DateTime<Utc>> {
    let tomorrow = zone.today(now).succ_opt()?;
    zone.from_local(tomorrow.and_time(NaiveTime::MIN))
        .or_else(|| zone.from_local(tomorrow.and_hms_opt(1, 0, 0)?))
}

/// The set of armed timers. Owned by whoever drives delivery.
#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<PendingTimer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every pending timer, then arm `timers`.
    pub fn reschedule(&mut self, mut timers: Vec<PendingTimer>) {
        self.cancel_all();
        timers.sort_by_key(|t| t.due);
        tracing::debug!(count = timers.len(), "Rescheduled reminders");
        self.pending = timers;
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn pending(&self) -> &[PendingTimer] {
        &self.pending
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.first().map(|t| t.due)
    }

    /// Remove and return every reminder due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: DateTime<Utc>) -> Vec<Reminder> {
        let split = self.pending.partition_point(|t| t.due <= now);
        self.pending.drain(..split).map(|t| t.reminder).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventDraft;
    use chrono::{FixedOffset, TimeZone};

    fn zone() -> Zone {
        Zone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap())
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// 08:00 local on 2024-01-15 (+07:00)
    fn eight_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 1, 0, 0).unwrap()
    }

    fn event(title: &str, time: Option<NaiveTime>) -> Event {
        let mut draft = EventDraft::new(title, day());
        if let Some(time) = time {
            draft = draft.at(time);
        }
        Event::new(draft).unwrap()
    }

    fn lead() -> TimeDelta {
        TimeDelta::minutes(15)
    }

    #[test]
    fn test_reminder_fifteen_minutes_before_start() {
        let events = vec![event("Standup", Some(hm(9, 0)))];

        let timers = plan(&events, &Settings::default(), eight_am(), &zone(), lead());

        assert_eq!(timers.len(), 1);
        assert_eq!(timers[0].due, Utc.with_ymd_and_hms(2024, 1, 15, 1, 45, 0).unwrap());
        assert!(matches!(
            &timers[0].reminder,
            Reminder::BeforeEvent { title, time, .. } if title == "Standup" && time == "09:00"
        ));
    }

    #[test]
    fn test_only_eligible_events_are_planned() {
        let mut done = event("Done already", Some(hm(10, 0)));
        done.completed = true;
        let quiet = Event::new(EventDraft::new("Quiet", day()).at(hm(11, 0)).notify(false)).unwrap();
        let untimed = event("Whenever", None);
        let too_close = event("Too close", Some(hm(8, 10)));
        let tomorrow = Event::new(
            EventDraft::new("Tomorrow", day().succ_opt().unwrap()).at(hm(9, 0)),
        )
        .unwrap();
        let kept = event("Lunch", Some(hm(12, 0)));

        let events = vec![done, quiet, untimed, too_close, tomorrow, kept];
        let timers = plan(&events, &Settings::default(), eight_am(), &zone(), lead());

        assert_eq!(timers.len(), 1);
        assert!(matches!(
            &timers[0].reminder,
            Reminder::BeforeEvent { title, .. } if title == "Lunch"
        ));
    }

    #[test]
    fn test_daily_summary_only_when_morning_time_is_ahead() {
        let settings = Settings::default();
        let timers = plan(&[], &settings, eight_am(), &zone(), lead());
        assert!(timers.is_empty(), "07:00 has already passed at 08:00");

        let settings = Settings {
            morning_time: "12:30".to_string(),
            ..Settings::default()
        };
        let timers = plan(&[], &settings, eight_am(), &zone(), lead());
        assert_eq!(
            timers,
            vec![PendingTimer {
                due: Utc.with_ymd_and_hms(2024, 1, 15, 5, 30, 0).unwrap(),
                reminder: Reminder::DailySummary { date: day() },
            }]
        );
    }

    #[test]
    fn test_disabled_settings_plan_nothing() {
        let settings = Settings {
            daily_summary: false,
            before_event: false,
            morning_time: "12:30".to_string(),
            ..Settings::default()
        };
        let events = vec![event("Standup", Some(hm(9, 0)))];

        assert!(plan(&events, &settings, eight_am(), &zone(), lead()).is_empty());
    }

    #[test]
    fn test_reschedule_replaces_pending_timers() {
        let mut scheduler = Scheduler::new();
        let events = vec![event("Standup", Some(hm(9, 0))), event("Lunch", Some(hm(12, 0)))];

        scheduler.reschedule(plan(&events, &Settings::default(), eight_am(), &zone(), lead()));
        assert_eq!(scheduler.pending().len(), 2);

        scheduler.reschedule(plan(&events[1..], &Settings::default(), eight_am(), &zone(), lead()));
        assert_eq!(scheduler.pending().len(), 1);
        assert_eq!(
            scheduler.next_deadline(),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 4, 45, 0).unwrap())
        );
    }

    #[test]
    fn test_take_due_pops_in_order() {
        let clock = ManualClock::new(eight_am());
        let mut scheduler = Scheduler::new();
        let events = vec![event("Lunch", Some(hm(12, 0))), event("Standup", Some(hm(9, 0)))];
        scheduler.reschedule(plan(&events, &Settings::default(), clock.now(), &zone(), lead()));

        assert!(scheduler.take_due(clock.now()).is_empty());

        clock.advance(TimeDelta::minutes(45));
        let due = scheduler.take_due(clock.now());
        assert_eq!(due.len(), 1);
        assert!(matches!(&due[0], Reminder::BeforeEvent { title, .. } if title == "Standup"));

        clock.advance(TimeDelta::hours(6));
        assert_eq!(scheduler.take_due(clock.now()).len(), 1);
        assert_eq!(scheduler.next_deadline(), None);
    }

    #[test]
    fn test_next_midnight_is_local() {
        assert_eq!(
            next_midnight(eight_am(), &zone()),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 17, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_notification_text() {
        let n = Notification::before_event("Dentist", "14:30", "", lead(), Locale::Thai);
        assert_eq!(n.title, "⏰ อีก 15 นาที: Dentist");
        assert_eq!(n.body, "เวลา 14:30");

        let n = Notification::before_event(
            "Dentist",
            "14:30",
            "Bring card",
            TimeDelta::minutes(10),
            Locale::English,
        );
        assert_eq!(n.title, "⏰ In 10 minutes: Dentist");
        assert_eq!(n.body, "At 14:30 — Bring card");

        let n = Notification::daily_summary(3, Locale::Thai);
        assert_eq!(n.title, "🌅 สรุปกิจกรรมวันนี้");
        assert_eq!(n.body, "คุณมี 3 กิจกรรมที่ต้องทำวันนี้");
    }
}
