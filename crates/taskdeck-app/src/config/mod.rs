//! Configuration file parsing for taskdeck
//!
//! Supports `.taskdeck/config.toml` in the working directory, or an explicit
//! file passed with `--config`.

pub mod settings;
pub mod types;

pub use settings::{load_settings, load_settings_file};
pub use types::*;
