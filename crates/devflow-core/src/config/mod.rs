//! Application configuration schemas.
//!
//! Configuration is deserialized from an optional TOML file via the
//! `config` crate, overlaid with `DEVFLOW__`-prefixed environment
//! variables, and validated with `validator` before use.

pub mod hooks;
pub mod logging;
pub mod paths;

use std::path::Path;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::hooks::HooksConfig;
use self::logging::LoggingConfig;
use self::paths::PathsConfig;

use crate::error::AppError;

/// Default configuration file looked up when no explicit path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config/devflow";

/// Root application configuration.
#[derive(Debug, Clone, Default, Validate, Serialize, Deserialize)]
pub struct DevflowConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Collaborator file locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Built-in hook toggles.
    #[serde(default)]
    #[validate(nested)]
    pub hooks: HooksConfig,
}

impl DevflowConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `config/devflow.toml`
    /// is read if present. Environment variables such as
    /// `DEVFLOW__HOOKS__SUGGESTIONS__MAX_SUGGESTIONS=5` override both.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let file_source = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("DEVFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DevflowConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hooks.backup.max_backups, 10);
        assert_eq!(config.hooks.critical_review.throttle_ms, 5000);
        assert!(!config.hooks.critical_review.enable_critical_review);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devflow.toml");
        std::fs::write(
            &path,
            r#"
[logging]
level = "debug"

[hooks.suggestions]
min_match_score = 3
max_suggestions = 2

[hooks.critical_review]
enable_critical_review = true
throttle_ms = 100
"#,
        )
        .unwrap();

        let config = DevflowConfig::load(Some(&path)).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.hooks.suggestions.min_match_score, 3);
        assert_eq!(config.hooks.suggestions.max_suggestions, 2);
        assert_eq!(config.hooks.suggestions.throttle_minutes, 30);
        assert!(config.hooks.critical_review.enable_critical_review);
        assert_eq!(config.hooks.critical_review.throttle_ms, 100);
        assert_eq!(config.hooks.backup.max_backups, 10);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devflow.toml");
        std::fs::write(&path, "[hooks.suggestions]\nmax_suggestions = 0\n").unwrap();

        let err = DevflowConfig::load(Some(&path)).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Validation);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DevflowConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
