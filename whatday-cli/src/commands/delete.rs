use anyhow::Result;
use dialoguer::Confirm;
use owo_colors::OwoColorize;

use super::Session;
use crate::render::Render;

pub fn run(session: &mut Session, id: &str, force: bool) -> Result<()> {
    let event = session.store.resolve(id)?;
    let id = event.id.clone();

    // Confirm unless --force
    if !force {
        println!("{}", event.render(session.locale()));
        println!();
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", event.title))
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let removed = session.store.delete(&id)?;
    println!("{}", format!("  Deleted: {}", removed.title).red());

    Ok(())
}
