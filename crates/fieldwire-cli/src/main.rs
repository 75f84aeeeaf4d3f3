//! fieldwire CLI
//!
//! Command-line tool for replaying field notifications against the
//! details-of-use form.

mod script;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use fieldwire_bus::Channel;
use fieldwire_forms::DetailsOfUseConfig;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::script::{format_outcome, Replay};

/// Replays field notifications through a synchronous field bus.
#[derive(Parser)]
#[command(name = "fieldwire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file with the initial data of the details-of-use form.
    #[arg(short, long, env = "FIELDWIRE_INITIAL_DATA")]
    initial_data: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a script of emits and inputs and print the derived values.
    Replay {
        /// Script file (JSON array of steps).
        script: PathBuf,

        /// Print the outcome as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the form HTML.
    Render {
        /// Form action URL.
        #[arg(long, default_value = "/details-of-use")]
        action: String,

        /// Form method.
        #[arg(long, default_value = "POST")]
        method: String,
    },

    /// List the notification channels.
    Channels,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DetailsOfUseConfig> {
    let Some(path) = path else {
        return Ok(DetailsOfUseConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("invalid initial data in {}", path.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(cli.initial_data.as_deref())?;

    match cli.command {
        Commands::Replay { script, json } => {
            let steps = script::load(&script)?;
            info!("Replaying {} steps from {}", steps.len(), script.display());

            let mut replay = Replay::start(&config)?;
            replay.run(&steps);
            let outcome = replay.outcome();

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", format_outcome(&outcome));
            }
        }

        Commands::Render { action, method } => {
            let replay = Replay::start(&config)?;
            println!("{}", replay.render(&action, &method));
        }

        Commands::Channels => {
            for channel in Channel::ALL {
                println!("{channel}");
            }
        }
    }

    Ok(())
}
