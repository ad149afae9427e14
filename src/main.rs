//! taskdeck - headless management console for projects, tasks, and developers
//!
//! This is the binary entry point. All logic lives in the library crates.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};

use taskdeck_app::config::{load_settings, load_settings_file};
use taskdeck_app::Route;

/// taskdeck - manage projects, tasks, and developers from the command line
#[derive(Parser, Debug)]
#[command(name = "taskdeck")]
#[command(about = "Headless console for projects, tasks, and developers", long_about = None)]
struct Args {
    /// Settings file (defaults to .taskdeck/config.toml in the working directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Route to open first, e.g. /projects or /tasks/3
    #[arg(long, value_name = "ROUTE")]
    start: Option<String>,

    /// Simulated backend latency in milliseconds
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => load_settings_file(path)?,
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            load_settings(&cwd)
        }
    };
    if let Some(latency_ms) = args.latency_ms {
        settings.backend.latency_ms = latency_ms;
    }

    // Settings choose the log directory, so logging starts after they load
    taskdeck_core::logging::init(&settings.logging.options())?;

    let start = args
        .start
        .as_deref()
        .map(|raw| {
            raw.parse::<Route>()
                .map_err(|e| eyre!("Invalid --start route {}: {}", raw, e))
        })
        .transpose()?;

    taskdeck::run_headless(settings, start).await?;
    Ok(())
}
