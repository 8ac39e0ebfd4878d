//! The "current project" marker and the switch operation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::error::{HookError, HookResult};

/// Reads and changes the active project.
#[async_trait]
pub trait ProjectSwitcher: Send + Sync {
    /// Identifier of the active project, if any.
    async fn current_project(&self) -> HookResult<Option<String>>;

    /// Makes `project_id`, rooted at or containing `directory`, active.
    async fn switch_project(&self, project_id: &str, directory: &Path) -> HookResult<()>;
}

/// Keeps the active project identifier in a plain-text marker file.
#[derive(Debug, Clone)]
pub struct MarkerFileSwitcher {
    path: PathBuf,
}

impl MarkerFileSwitcher {
    /// Creates a switcher backed by the marker at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ProjectSwitcher for MarkerFileSwitcher {
    async fn current_project(&self) -> HookResult<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => {
                let id = raw.trim();
                Ok((!id.is_empty()).then(|| id.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(HookError::io(
                format!("Failed to read marker '{}'", self.path.display()),
                e,
            )),
        }
    }

    async fn switch_project(&self, project_id: &str, directory: &Path) -> HookResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                HookError::io(format!("Failed to create '{}'", parent.display()), e)
            })?;
        }

        tokio::fs::write(&self.path, format!("{project_id}\n"))
            .await
            .map_err(|e| HookError::io(format!("Failed to write marker '{}'", self.path.display()), e))?;

        info!(
            project = %project_id,
            directory = %directory.display(),
            "Active project switched"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_marker_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let switcher = MarkerFileSwitcher::new(dir.path().join("state/current-project"));

        assert_eq!(switcher.current_project().await.unwrap(), None);

        switcher.switch_project("api", dir.path()).await.unwrap();
        assert_eq!(
            switcher.current_project().await.unwrap(),
            Some("api".to_string())
        );
    }
}
