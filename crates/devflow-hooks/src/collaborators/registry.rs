//! Project registry: known project roots and their identifiers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HookError, HookResult};

/// Registry-wide settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySettings {
    /// Whether changing directory into another project switches to it.
    #[serde(default)]
    pub auto_switch_on_directory_change: Option<bool>,
}

/// Contents of the project registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Registry-wide settings.
    #[serde(default)]
    pub settings: RegistrySettings,
    /// Project root path → project identifier.
    #[serde(default)]
    pub projects: BTreeMap<String, String>,
}

/// Read-only source of the project registry.
#[async_trait]
pub trait ProjectRegistry: Send + Sync {
    /// Reads the full registry.
    async fn load(&self) -> HookResult<RegistrySnapshot>;
}

/// Registry stored as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonProjectRegistry {
    path: PathBuf,
}

impl JsonProjectRegistry {
    /// Creates a registry reader for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProjectRegistry for JsonProjectRegistry {
    async fn load(&self) -> HookResult<RegistrySnapshot> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            HookError::Configuration(format!(
                "Cannot read project registry '{}': {e}",
                self.path.display()
            ))
        })?;

        let snapshot: RegistrySnapshot = serde_json::from_str(&raw).map_err(|e| {
            HookError::Configuration(format!(
                "Invalid project registry '{}': {e}",
                self.path.display()
            ))
        })?;

        debug!(
            path = %self.path.display(),
            projects = snapshot.projects.len(),
            "Project registry loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_registry_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(
            &path,
            r#"{"settings":{"autoSwitchOnDirectoryChange":false},"projects":{"/work/app":"app"}}"#,
        )
        .unwrap();

        let snapshot = JsonProjectRegistry::new(&path).load().await.unwrap();
        assert_eq!(snapshot.settings.auto_switch_on_directory_change, Some(false));
        assert_eq!(snapshot.projects.get("/work/app").map(String::as_str), Some("app"));
    }

    #[tokio::test]
    async fn test_missing_registry_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonProjectRegistry::new(dir.path().join("absent.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, HookError::Configuration(_)));
    }
}
