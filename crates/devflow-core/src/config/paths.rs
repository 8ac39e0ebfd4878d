//! Locations of the external collaborator files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Paths to the project registry and the "current project" marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// JSON project registry: `{ "settings": {...}, "projects": {path: id} }`.
    #[serde(default = "default_registry_file")]
    pub registry_file: String,
    /// Plain-text marker holding the active project identifier.
    #[serde(default = "default_current_project_file")]
    pub current_project_file: String,
}

impl PathsConfig {
    /// Registry path with a leading `~/` expanded.
    pub fn registry_path(&self) -> PathBuf {
        expand_home(&self.registry_file)
    }

    /// Marker path with a leading `~/` expanded.
    pub fn current_project_path(&self) -> PathBuf {
        expand_home(&self.current_project_file)
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            registry_file: default_registry_file(),
            current_project_file: default_current_project_file(),
        }
    }
}

/// Expands a leading `~/` using `$HOME`. Other paths are returned as-is.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}

fn default_registry_file() -> String {
    "~/.devflow/projects.json".to_string()
}

fn default_current_project_file() -> String {
    "~/.devflow/current-project".to_string()
}
