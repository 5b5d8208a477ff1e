use anyhow::Result;
use owo_colors::OwoColorize;
use whatday_core::WhatDayConfig;
use whatday_core::constants::{EVENTS_KEY, SETTINGS_KEY};

use super::Session;

pub fn run(session: &Session) -> Result<()> {
    let config_path = WhatDayConfig::config_path()?;
    let whatday = &session.whatday;
    let storage = whatday.storage();

    println!("{}", "Paths".bold());
    println!("  Config:    {}", config_path.display());
    println!("  Data:      {}", whatday.data_path().display());
    println!("  Events:    {}", storage.path_for(EVENTS_KEY).display());
    println!("  Settings:  {}", storage.path_for(SETTINGS_KEY).display());
    println!();
    println!("{}", "Options".bold());
    println!("  Locale:    {}", whatday.locale().language_tag());
    println!("  Timezone:  {}", session.zone);
    println!(
        "  Relay:     {}",
        whatday.import_relay().unwrap_or("(direct)")
    );
    println!(
        "  Speech:    {}",
        whatday.speech_command().unwrap_or("(auto)")
    );
    println!("  Reminder:  {} min before", whatday.reminder_lead()?.num_minutes());

    Ok(())
}
