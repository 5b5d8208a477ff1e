use anyhow::Result;

use super::Session;
use crate::render::{self, Render};

pub fn run(session: &Session, date: Option<&str>, json: bool) -> Result<()> {
    let date = session.date_arg(date)?;
    let events = session.store.events_on(date);

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    let locale = session.locale();
    println!("{}", render::day_heading(date, session.today(), locale));
    println!("{}", session.store.stats_on(date).render(locale));
    println!();

    if events.is_empty() {
        println!("{}", render::empty_day(locale));
        return Ok(());
    }

    for event in events {
        println!("{}", event.render(locale));
    }

    Ok(())
}
