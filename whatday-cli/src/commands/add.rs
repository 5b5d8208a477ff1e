use anyhow::{Result, bail};
use chrono::NaiveTime;
use clap::Args;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;
use whatday_core::{Category, EventDraft, Locale};

use super::Session;
use crate::render::short_id;
use crate::utils::dates;
use crate::utils::tui::{prompt_optional, prompt_with_retry};

#[derive(Args)]
pub struct AddArgs {
    /// Event title. Leave out to be asked for each field
    pub title: Option<String>,

    /// Day (YYYY-MM-DD, "tomorrow", "next friday"). Defaults to today
    #[arg(short, long)]
    pub date: Option<String>,

    /// Start time (HH:MM or "3pm"). Leave out for a task without a time
    #[arg(short, long)]
    pub time: Option<String>,

    /// End time, or a duration after the start (e.g. "45m")
    #[arg(short, long)]
    pub end: Option<String>,

    /// work, personal, health, study, meeting or other
    #[arg(short, long)]
    pub category: Option<Category>,

    #[arg(short, long)]
    pub notes: Option<String>,

    /// Don't send a reminder before this event
    #[arg(long)]
    pub no_notify: bool,
}

pub fn run(session: &mut Session, args: AddArgs) -> Result<()> {
    let interactive = args.title.is_none();
    let today = session.today();
    let locale = session.locale();

    // --- Title ---
    let title = match args.title {
        Some(t) => t,
        None => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
    };

    // --- Day ---
    let date = match args.date {
        Some(d) => dates::parse_date(&d, today)?,
        None if interactive => {
            prompt_with_retry("  When?", Some("today"), |s| dates::parse_date(s, today))?
        }
        None => today,
    };

    // --- Time ---
    let time = match args.time {
        Some(t) => Some(dates::parse_time(&t)?),
        None if interactive => prompt_with_retry("  What time? (skip)", None, optional_time)?,
        None => None,
    };

    // --- End ---
    let end = match (time, args.end) {
        (Some(start), Some(e)) => Some(dates::parse_end(&e, start)?),
        (None, Some(_)) => bail!("--end needs a start time (--time)"),
        (Some(start), None) if interactive => {
            prompt_with_retry("  Until? (skip)", None, |s| {
                if s.is_empty() {
                    Ok(None)
                } else {
                    dates::parse_end(s, start).map(Some)
                }
            })?
        }
        _ => None,
    };

    // --- Category ---
    let category = match args.category {
        Some(c) => c,
        None if interactive => select_category(locale)?,
        None => Category::Other,
    };

    // --- Notes ---
    let notes = match args.notes {
        Some(n) => n,
        None if interactive => prompt_optional("  Notes? (skip)")?,
        None => String::new(),
    };

    let mut draft = EventDraft::new(title, date)
        .category(category)
        .notes(notes)
        .notify(!args.no_notify);
    if let Some(time) = time {
        draft = draft.at(time);
    }
    if let Some(end) = end {
        draft = draft.until(end);
    }

    let event = session.store.add(draft)?;

    if interactive {
        println!();
    }
    println!(
        "{} {}",
        format!("  Added: {}", event.title).green(),
        format!("[{}]", short_id(&event.id)).dimmed()
    );

    Ok(())
}

fn optional_time(input: &str) -> Result<Option<NaiveTime>> {
    if input.is_empty() {
        return Ok(None);
    }
    dates::parse_time(input).map(Some)
}

fn select_category(locale: Locale) -> Result<Category> {
    let items: Vec<&str> = Category::ALL.iter().map(|c| c.label(locale)).collect();
    let default = Category::ALL
        .iter()
        .position(|c| *c == Category::Other)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("  Category")
        .items(&items)
        .default(default)
        .interact()?;

    Ok(Category::ALL[selection])
}
