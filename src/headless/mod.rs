//! Headless mode - line commands in, JSON events out
//!
//! Commands are read from stdin, one per line (see [`command`]). Events are
//! written to stdout as NDJSON (newline-delimited JSON), one event per line.
//! Each event has an "event" field indicating its type.
//!
//! # Example Output
//!
//! ```json
//! {"event":"snapshot","route":"/tasks","screen":{"screen":"list","kind":"task","content":{"state":"loading"},"deleting":false},"can_go_back":false,"timestamp":1704700001000}
//! {"event":"error","message":"'submit' is not available on /tasks","fatal":false,"timestamp":1704700002000}
//! ```

pub mod command;
pub mod runner;

use chrono::Utc;
use serde::Serialize;
use std::io::{self, Write};
use tracing::error;

use taskdeck_app::AppSnapshot;

/// Events emitted in headless mode
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    /// The console state changed
    Snapshot {
        #[serde(flatten)]
        snapshot: AppSnapshot,
        timestamp: i64,
    },

    /// A command was rejected or something went wrong
    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

impl HeadlessEvent {
    /// Emit this event to stdout as JSON
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize headless event: {}", e);
                return;
            }
        };

        // NDJSON: one event per line, flushed immediately
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write headless event to stdout: {}", e);
            return;
        }
        if let Err(e) = stdout.flush() {
            error!("Failed to flush headless stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    pub fn snapshot(snapshot: AppSnapshot) -> Self {
        Self::Snapshot {
            snapshot,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: impl Into<String>, fatal: bool) -> Self {
        Self::Error {
            message: message.into(),
            fatal,
            timestamp: Self::now(),
        }
    }
}
