//! File logging for the console
//!
//! Stdout carries the NDJSON event stream, so every log line goes to a daily
//! rolling file instead. The filter is picked in this order: `TASKDECK_LOG`,
//! the configured level, then [`DEFAULT_FILTER`].

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable overriding the configured filter
pub const FILTER_ENV: &str = "TASKDECK_LOG";

pub const DEFAULT_FILTER: &str = "taskdeck=info,taskdeck_app=info,taskdeck_client=info,warn";

const LOG_FILE_PREFIX: &str = "taskdeck.log";

/// Where and how much to log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Log directory; `<data_local_dir>/taskdeck/logs` when unset
    pub directory: Option<PathBuf>,
    /// `EnvFilter` directives, e.g. `debug` or `taskdeck_app=trace`
    pub filter: Option<String>,
}

impl LogOptions {
    pub fn directory(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("taskdeck")
                .join("logs"),
        }
    }

    /// Filter directives after applying the environment override
    pub fn filter_directives(&self, env_override: Option<String>) -> String {
        env_override
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.filter.clone())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

/// Install the global subscriber. Returns the directory being written to.
pub fn init(options: &LogOptions) -> Result<PathBuf> {
    let log_dir = options.directory();
    std::fs::create_dir_all(&log_dir)?;

    let directives = options.filter_directives(std::env::var(FILTER_ENV).ok());
    let env_filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Ignoring log filter {:?}: {}", directives, e);
        EnvFilter::new(DEFAULT_FILTER)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(appender(&log_dir))
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!(dir = %log_dir.display(), filter = %directives, "taskdeck logging started");
    Ok(log_dir)
}

fn appender(dir: &Path) -> RollingFileAppender {
    RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX)
}
