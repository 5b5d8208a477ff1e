use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use whatday_core::Settings;
use whatday_core::datetime::format_clock;

use super::Session;
use crate::render::Render;
use crate::utils::dates;

#[derive(Args)]
pub struct SettingsArgs {
    /// Morning notification with the number of open events
    #[arg(long)]
    pub daily_summary: Option<bool>,

    /// Reminder shortly before each timed event
    #[arg(long)]
    pub before_event: Option<bool>,

    /// Read the day aloud when the morning summary fires
    #[arg(long)]
    pub auto_voice: Option<bool>,

    /// When the morning summary fires (HH:MM)
    #[arg(long)]
    pub morning_time: Option<String>,
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.daily_summary.is_none()
            && self.before_event.is_none()
            && self.auto_voice.is_none()
            && self.morning_time.is_none()
    }
}

pub fn run(session: &Session, args: SettingsArgs) -> Result<()> {
    let storage = session.store.storage();
    let mut settings = Settings::load(storage);
    let locale = session.locale();

    if args.is_empty() {
        println!("{}", settings.render(locale));
        return Ok(());
    }

    if let Some(value) = args.daily_summary {
        settings.daily_summary = value;
    }
    if let Some(value) = args.before_event {
        settings.before_event = value;
    }
    if let Some(value) = args.auto_voice {
        settings.auto_voice = value;
    }
    if let Some(time) = args.morning_time {
        settings.morning_time = format_clock(dates::parse_time(&time)?);
    }

    settings.save(storage)?;

    println!("{}", "  Settings saved".green());
    println!("{}", settings.render(locale));

    Ok(())
}
