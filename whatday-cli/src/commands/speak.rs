use anyhow::Result;
use owo_colors::OwoColorize;
use whatday_core::narrator::{self, CommandSpeaker, Speaker};

use super::Session;

pub async fn run(session: &Session, date: Option<&str>, print_only: bool) -> Result<()> {
    let date = session.date_arg(date)?;
    let locale = session.locale();
    let text = narrator::compose(&session.store.events_on(date), date, locale);

    println!("{}", text.dimmed());
    if print_only {
        return Ok(());
    }

    let mut speaker = CommandSpeaker::detect(session.whatday.speech_command(), locale)?;
    speaker.speak(&text).await?;

    // Stop talking on Ctrl-C instead of leaving the speech process behind
    tokio::select! {
        result = speaker.finish() => result?,
        _ = tokio::signal::ctrl_c() => speaker.stop().await,
    }

    Ok(())
}
