//! Configuration types for taskdeck
//!
//! Defines:
//! - `Settings` - Global application settings
//! - `BehaviorSettings`, `BackendSettings`, `LoggingSettings` - Sections of `config.toml`
//! - `ConfirmPolicy` - How delete confirmations are answered

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use taskdeck_core::logging::LogOptions;

/// How delete confirmations are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmPolicy {
    /// Prompt on the controlling terminal
    #[default]
    Ask,
    /// Accept without asking
    Always,
    /// Decline without asking
    Never,
}

/// Global settings from `.taskdeck/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub behavior: BehaviorSettings,

    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Behavior settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BehaviorSettings {
    /// Route opened on startup
    #[serde(default = "default_start_route")]
    pub start_route: String,

    #[serde(default)]
    pub confirm_deletes: ConfirmPolicy,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            start_route: default_start_route(),
            confirm_deletes: ConfirmPolicy::default(),
        }
    }
}

/// In-memory backend settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Simulated latency per Entity Client call
    #[serde(default)]
    pub latency_ms: u64,

    /// Populate sample data on startup
    #[serde(default = "default_true")]
    pub seed_demo_data: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            latency_ms: 0,
            seed_demo_data: true,
        }
    }
}

/// Log file settings. `TASKDECK_LOG` still overrides `level`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Filter directives, e.g. `"debug"` or `"taskdeck_app=trace,warn"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

impl LoggingSettings {
    pub fn options(&self) -> LogOptions {
        LogOptions {
            directory: self.directory.clone(),
            filter: self.level.clone(),
        }
    }
}

fn default_start_route() -> String {
    "/tasks".to_string()
}

fn default_true() -> bool {
    true
}
