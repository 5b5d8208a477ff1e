//! whatday-notify: delivers whatday reminders as desktop notifications.
//!
//! Plans today's reminders, sleeps until the next one is due and plans
//! again whenever the stored events or settings change, or a new day starts.
//! The CLI and this daemon only share the data directory.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use clap::Parser;
use whatday_core::narrator::{self, CommandSpeaker, Speaker};
use whatday_core::scheduler::{self, Clock, Notification, Reminder, Scheduler, SystemClock};
use whatday_core::{EventStore, FileStorage, Locale, Settings, Storage, WhatDay, Zone};

#[derive(Parser)]
#[command(name = "whatday-notify")]
#[command(about = "Desktop notifications for whatday reminders")]
#[command(version)]
struct Args {
    /// Print notifications to stdout instead of showing them
    #[arg(long)]
    print: bool,
}

struct Daemon {
    store: EventStore<FileStorage>,
    settings: Settings,
    scheduler: Scheduler,
    zone: Zone,
    locale: Locale,
    lead: TimeDelta,
    speech_command: Option<String>,
    speaker: Option<CommandSpeaker>,
    planned_for: NaiveDate,
    print: bool,
}

impl Daemon {
    fn new(whatday: &WhatDay, now: DateTime<Utc>, print: bool) -> Result<Self> {
        let zone = whatday.zone()?;
        let store = EventStore::load(whatday.storage());
        let settings = Settings::load(store.storage());

        let mut daemon = Daemon {
            store,
            settings,
            scheduler: Scheduler::new(),
            zone,
            locale: whatday.locale(),
            lead: whatday.reminder_lead()?,
            speech_command: whatday.speech_command().map(str::to_string),
            speaker: None,
            planned_for: zone.today(now),
            print,
        };
        daemon.replan(now);
        Ok(daemon)
    }

    fn replan(&mut self, now: DateTime<Utc>) {
        self.planned_for = self.zone.today(now);
        self.scheduler.reschedule(scheduler::plan(
            self.store.events(),
            &self.settings,
            now,
            &self.zone,
            self.lead,
        ));

        match self.scheduler.next_deadline() {
            Some(due) => tracing::info!(
                pending = self.scheduler.pending().len(),
                next = %self.zone.to_local(due).format("%H:%M"),
                "Planned reminders"
            ),
            None => tracing::info!("No reminders left today"),
        }
    }

    /// Pick up changes made by the CLI since the last look.
    fn refresh(&mut self, now: DateTime<Utc>) {
        let events_changed = self.store.reload();
        let settings = Settings::load(self.store.storage());
        let settings_changed = settings != self.settings;
        let new_day = self.zone.today(now) != self.planned_for;

        if events_changed || settings_changed || new_day {
            tracing::debug!(events_changed, settings_changed, new_day, "Replanning");
            self.settings = settings;
            self.replan(now);
        }
    }

    /// When to wake up next: the next reminder, the next poll or midnight.
    fn next_wake(&self, now: DateTime<Utc>, poll: TimeDelta) -> DateTime<Utc> {
        let next_poll = now
            .checked_add_signed(poll)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        [
            self.scheduler.next_deadline(),
            scheduler::next_midnight(now, &self.zone),
        ]
        .into_iter()
        .flatten()
        .fold(next_poll, std::cmp::min)
    }

    /// Reminders due at `now` that still apply to what is stored now.
    ///
    /// Timers were planned from an earlier read of storage, so storage is
    /// read again first and reminders for events that were completed,
    /// deleted, muted or moved since then are dropped.
    fn due_reminders(&mut self, now: DateTime<Utc>) -> Vec<Reminder> {
        let due = self.scheduler.take_due(now);
        self.refresh(now);

        due.into_iter()
            .filter(|reminder| {
                let wanted = self.still_wanted(reminder);
                if !wanted {
                    tracing::debug!(?reminder, "Dropping reminder for changed event");
                }
                wanted
            })
            .collect()
    }

    fn still_wanted(&self, reminder: &Reminder) -> bool {
        match reminder {
            Reminder::BeforeEvent { event_id, time, .. } => {
                self.settings.before_event
                    && self
                        .store
                        .get(event_id)
                        .is_some_and(|e| e.notify && !e.completed && e.time == *time)
            }
            Reminder::DailySummary { .. } => self.settings.daily_summary,
        }
    }

    async fn fire_due(&mut self, now: DateTime<Utc>) {
        for reminder in self.due_reminders(now) {
            let notification = notification_for(&reminder, &self.store, self.locale, self.lead);
            self.show(&notification);

            if let Reminder::DailySummary { date } = reminder {
                if self.settings.auto_voice {
                    self.read_aloud(date).await;
                }
            }
        }
    }

    fn show(&self, notification: &Notification) {
        tracing::info!(title = %notification.title, "Delivering notification");

        if self.print {
            println!("{}\n{}\n", notification.title, notification.body);
            return;
        }

        if let Err(e) = notify_rust::Notification::new()
            .appname("whatday")
            .summary(&notification.title)
            .body(&notification.body)
            .show()
        {
            tracing::warn!("Could not show notification: {e}");
        }
    }

    async fn read_aloud(&mut self, date: NaiveDate) {
        let text = narrator::compose(&self.store.events_on(date), date, self.locale);

        if self.speaker.is_none() {
            match CommandSpeaker::detect(self.speech_command.as_deref(), self.locale) {
                Ok(speaker) => self.speaker = Some(speaker),
                Err(e) => {
                    tracing::warn!("Not reading the summary aloud: {e}");
                    return;
                }
            }
        }

        if let Some(speaker) = self.speaker.as_mut() {
            if let Err(e) = speaker.speak(&text).await {
                tracing::warn!("Could not read the summary aloud: {e}");
            }
        }
    }
}

/// Render a fired reminder. Summary counts are taken now, not when planned.
fn notification_for<S: Storage>(
    reminder: &Reminder,
    store: &EventStore<S>,
    locale: Locale,
    lead: TimeDelta,
) -> Notification {
    match reminder {
        Reminder::BeforeEvent {
            title, time, notes, ..
        } => Notification::before_event(title, time, notes, lead, locale),
        Reminder::DailySummary { date } => {
            Notification::daily_summary(store.stats_on(*date).remaining, locale)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let whatday = WhatDay::load()?;
    let poll = whatday.poll_interval()?;
    let clock = SystemClock;

    tracing::info!(data = %whatday.data_path().display(), "whatday-notify starting");
    let mut daemon = Daemon::new(&whatday, clock.now(), args.print)?;

    loop {
        let now = clock.now();
        let wait = (daemon.next_wake(now, poll) - now)
            .to_std()
            .unwrap_or_default();

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, shutting down");
                break;
            }
        }

        daemon.fire_due(clock.now()).await;
    }

    if let Some(speaker) = daemon.speaker.as_mut() {
        speaker.stop().await;
    }

    Ok(())
}
