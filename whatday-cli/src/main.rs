mod commands;
mod fetch;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::Session;
use commands::add::AddArgs;
use commands::edit::EditArgs;
use commands::settings::SettingsArgs;

#[derive(Parser)]
#[command(name = "whatday")]
#[command(about = "What's on today: tasks, appointments, imported calendars and a spoken summary")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the events of a day (the default command)
    Day {
        /// YYYY-MM-DD, "tomorrow", "next friday"... Defaults to today
        date: Option<String>,

        /// Print the day's events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add an event
    Add(AddArgs),
    /// Change fields of an event
    Edit(EditArgs),
    /// Mark an event done, or not done again
    Done {
        /// Event id, or any unique prefix of it
        id: String,
    },
    /// Delete an event
    Delete {
        /// Event id, or any unique prefix of it
        id: String,

        /// Don't ask for confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Import events from a calendar URL (http, https, webcal) or .ics file.
    /// Without an argument, the last imported URL is fetched again
    Import { source: Option<String> },
    /// Read a day's events aloud
    Speak {
        #[arg(short, long)]
        date: Option<String>,

        /// Only print what would be said
        #[arg(long)]
        print: bool,
    },
    /// Show or change notification settings
    Settings(SettingsArgs),
    /// Export all events as an .ics calendar
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show config and data paths
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let mut session = Session::load()?;

    match cli.command.unwrap_or(Commands::Day {
        date: None,
        json: false,
    }) {
        Commands::Day { date, json } => commands::day::run(&session, date.as_deref(), json),
        Commands::Add(args) => commands::add::run(&mut session, args),
        Commands::Edit(args) => commands::edit::run(&mut session, args),
        Commands::Done { id } => commands::done::run(&mut session, &id),
        Commands::Delete { id, force } => commands::delete::run(&mut session, &id, force),
        Commands::Import { source } => commands::import::run(&mut session, source).await,
        Commands::Speak { date, print } => {
            commands::speak::run(&session, date.as_deref(), print).await
        }
        Commands::Settings(args) => commands::settings::run(&session, args),
        Commands::Export { output } => commands::export::run(&session, output),
        Commands::Config => commands::config::run(&session),
    }
}
