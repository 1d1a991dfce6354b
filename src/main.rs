mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use piclock_core::ClockConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "piclock")]
#[command(about = "Wall clock with the next five events from your calendar")]
struct Cli {
    /// Config file (defaults to ~/.config/piclock/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the clock and refresh the calendar (the default)
    Run {
        /// Never launch the fetcher, and re-read the event file every minute
        #[arg(short, long)]
        test: bool,
    },
    /// Print the calendar entries the clock would show right now
    Show {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a commented default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show the resolved paths and schedule
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the clock face
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "piclock=info,piclock_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { test: false }) {
        Commands::Run { test } => commands::run::run(load_config(cli.config)?, test).await,
        Commands::Show { json } => commands::show::run(load_config(cli.config)?, json),
        Commands::Init { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => ClockConfig::config_path()?,
            };
            commands::init::run(&path, force)
        }
        Commands::Config => commands::config::run(load_config(cli.config.clone())?, cli.config),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ClockConfig> {
    let config = match path {
        Some(path) => ClockConfig::load_from(&path)?,
        None => ClockConfig::load()?,
    };
    Ok(config)
}
