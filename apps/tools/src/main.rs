use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::View;
use store::{Clock, SystemClock, TodoState};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod replay;

use config::{load_settings, OutputFormat};
use replay::{render_text, replay_file, ReplayOptions};

#[derive(Parser, Debug)]
#[command(name = "todo-tools", about = "Replay task-store event scripts")]
struct Cli {
    /// Overrides the configured output format.
    #[arg(long, value_enum, global = true)]
    output: Option<OutputFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON-lines event script and print the resulting session.
    Replay {
        file: PathBuf,
        #[arg(long)]
        view: Option<View>,
        #[arg(long)]
        search: Option<String>,
        /// Start from an empty session instead of the sample tasks.
        #[arg(long)]
        empty: bool,
    },
    /// Print the seed session as JSON.
    Seed,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings()?;

    let filter = EnvFilter::try_new(&settings.log_filter)
        .with_context(|| format!("invalid log filter '{}'", settings.log_filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Replay {
            file,
            view,
            search,
            empty,
        } => {
            let options = ReplayOptions {
                seed: settings.seed && !empty,
                view,
                search,
            };
            info!(file = %file.display(), "replaying event script");
            let state = replay_file(&file, &options)?;
            match cli.output.unwrap_or(settings.output) {
                OutputFormat::Text => print!("{}", render_text(&state)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&*state)?),
            }
        }
        Command::Seed => {
            let state = TodoState::seeded(SystemClock.now());
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}
