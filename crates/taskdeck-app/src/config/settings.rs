//! Settings loading from `.taskdeck/config.toml`

use std::path::Path;

use taskdeck_core::prelude::*;

use super::types::Settings;

const TASKDECK_DIR: &str = ".taskdeck";
const CONFIG_FILENAME: &str = "config.toml";

/// Load settings from `<project>/.taskdeck/config.toml`.
///
/// A missing or unreadable file yields defaults.
pub fn load_settings(project_path: &Path) -> Settings {
    let config_path = project_path.join(TASKDECK_DIR).join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    match load_settings_file(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("{}; using defaults", e);
            Settings::default()
        }
    }
}

/// Load settings from an explicit path (`--config`).
///
/// Unlike [`load_settings`], a missing file is an error.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Reading settings from {}", path.display()))?;
    let settings = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {:?}: {}", path, e)))?;
    debug!("Loaded settings from {:?}", path);
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfirmPolicy;
    use tempfile::tempdir;
    use tokio_test::assert_err;

    #[test]
    fn test_load_settings_defaults() {
        let temp = tempdir().unwrap();
        let settings = load_settings(temp.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_custom() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join(".taskdeck");
        std::fs::create_dir_all(&dir).unwrap();

        let config = r#"
[behavior]
start_route = "/projects"
confirm_deletes = "always"

[backend]
latency_ms = 250
seed_demo_data = false
"#;
        std::fs::write(dir.join("config.toml"), config).unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings.behavior.start_route, "/projects");
        assert_eq!(settings.behavior.confirm_deletes, ConfirmPolicy::Always);
        assert_eq!(settings.backend.latency_ms, 250);
        assert!(!settings.backend.seed_demo_data);
    }

    #[test]
    fn test_load_settings_invalid_toml() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join(".taskdeck");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.toml"), "not valid toml {{{{").unwrap();

        let settings = load_settings(temp.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_file_missing_is_error() {
        let temp = tempdir().unwrap();
        let err = assert_err!(load_settings_file(&temp.path().join("nope.toml")));
        assert!(matches!(err, Error::ConfigNotFound { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_settings_file_invalid_is_config_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("bad.toml");
        std::fs::write(&path, "[backend]\nlatency_ms = \"fast\"\n").unwrap();
        let err = assert_err!(load_settings_file(&path));
        assert!(matches!(err, Error::Config { .. }));
    }
}
