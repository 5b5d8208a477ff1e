use anyhow::{Result, bail};
use clap::Args;
use owo_colors::OwoColorize;
use whatday_core::datetime::{date_key, format_clock};
use whatday_core::{Category, EventPatch};

use super::Session;
use crate::render::{Render, short_id};
use crate::utils::dates;

#[derive(Args)]
pub struct EditArgs {
    /// Event id, or any unique prefix of it
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// Move to another day
    #[arg(short, long)]
    pub date: Option<String>,

    /// New start time (HH:MM or "3pm")
    #[arg(short, long, conflicts_with = "no_time")]
    pub time: Option<String>,

    /// Make this a task without a time of day
    #[arg(long)]
    pub no_time: bool,

    /// New end time, or a duration after the start
    #[arg(short, long, conflicts_with = "no_end")]
    pub end: Option<String>,

    /// Remove the end time
    #[arg(long)]
    pub no_end: bool,

    #[arg(short, long)]
    pub category: Option<Category>,

    #[arg(short, long)]
    pub notes: Option<String>,

    /// Turn the reminder for this event on or off
    #[arg(long)]
    pub notify: Option<bool>,
}

pub fn run(session: &mut Session, args: EditArgs) -> Result<()> {
    let today = session.today();
    let event = session.store.resolve(&args.id)?;
    let id = event.id.clone();

    let mut patch = EventPatch {
        title: args.title,
        category: args.category.map(|c| c.as_str().to_string()),
        notes: args.notes,
        notify: args.notify,
        ..EventPatch::default()
    };

    if let Some(date) = args.date {
        patch.date = Some(date_key(dates::parse_date(&date, today)?));
    }

    let start = match (args.time, args.no_time) {
        (Some(time), _) => {
            let time = dates::parse_time(&time)?;
            patch.time = Some(format_clock(time));
            Some(time)
        }
        (None, true) => {
            patch.time = Some(String::new());
            patch.end_time = Some(None);
            None
        }
        (None, false) => event.start_time(),
    };

    if let Some(end) = args.end {
        let Some(start) = start else {
            bail!("--end needs a start time");
        };
        patch.end_time = Some(Some(format_clock(dates::parse_end(&end, start)?)));
    } else if args.no_end {
        patch.end_time = Some(None);
    }

    if patch.is_empty() {
        bail!("Nothing to change. See `whatday edit --help` for the fields you can set");
    }

    let locale = session.locale();
    let event = session.store.update(&id, patch)?;

    println!(
        "{} {}",
        "  Updated:".green(),
        format!("[{}]", short_id(&event.id)).dimmed()
    );
    println!("{}", event.render(locale));

    Ok(())
}
