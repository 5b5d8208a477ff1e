use anyhow::Result;
use owo_colors::OwoColorize;

use super::Session;

pub fn run(session: &mut Session, id: &str) -> Result<()> {
    let event = session.store.resolve(id)?;
    let (id, title) = (event.id.clone(), event.title.clone());

    if session.store.toggle_complete(&id)? {
        println!("{}", format!("  ✓ Done: {title}").green());
    } else {
        println!("{}", format!("  ○ Not done: {title}").yellow());
    }

    Ok(())
}
