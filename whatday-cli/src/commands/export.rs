use std::path::PathBuf;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use whatday_core::ics::generate_ics;

use super::Session;

pub fn run(session: &Session, output: Option<PathBuf>) -> Result<()> {
    let events = session.store.events();
    let ics = generate_ics(events)?;

    match output {
        Some(path) => {
            std::fs::write(&path, ics)
                .with_context(|| format!("Could not write {}", path.display()))?;
            eprintln!(
                "{}",
                format!("Exported {} events to {}", events.len(), path.display()).green()
            );
        }
        None => print!("{ics}"),
    }

    Ok(())
}
