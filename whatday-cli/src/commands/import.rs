use anyhow::{Result, bail};
use owo_colors::OwoColorize;
use whatday_core::ics::import_calendar;
use whatday_core::{EventStore, Storage, WhatDayError, WhatDayResult};

use super::Session;
use crate::fetch::{self, ImportSource};
use crate::utils::tui;

pub async fn run(session: &mut Session, source: Option<String>) -> Result<()> {
    let input = match source.or_else(|| session.store.last_import_url()) {
        Some(input) => input,
        None => bail!(
            "No calendar given.\n\n\
            Import a URL or a file with:\n  \
            whatday import <url-or-file>"
        ),
    };
    let source = ImportSource::parse(&input)?;

    let spinner = tui::create_spinner(format!("Importing {}", source.describe()));
    let text = fetch::fetch(&source, session.whatday.import_relay()).await;
    spinner.finish_and_clear();

    let text = match text {
        Ok(text) => text,
        Err(e) => {
            println!("{}", format!("Import failed: {e:#}").red());
            return Ok(());
        }
    };

    let imported = import_calendar(&mut session.store, &text, &session.zone);
    remember_source(&session.store, &source, &input, &imported);

    match imported {
        Ok(count) => {
            let noun = if count == 1 { "event" } else { "events" };
            println!("{}", format!("Imported {count} {noun}").green());
        }
        Err(WhatDayError::NoEventsFound) => {
            println!("{}", WhatDayError::NoEventsFound.to_string().yellow());
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Keep a URL for the next bare `whatday import`, but only once it imported.
fn remember_source<S: Storage>(
    store: &EventStore<S>,
    source: &ImportSource,
    input: &str,
    imported: &WhatDayResult<usize>,
) {
    if imported.is_ok() && matches!(source, ImportSource::Url(_)) {
        store.set_last_import_url(input);
    }
}
