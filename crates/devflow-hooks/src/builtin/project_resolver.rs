//! Cached directory-to-project resolution (`USER_PROMPT_SUBMIT`).
//!
//! The project index (registered root path → project id) is read from the
//! registry once and kept in a TTL cache. Each prompt resolves the first
//! directory it names that lies inside a registered project, else the
//! working directory, to the project with the longest matching root.
//! When auto-switch is enabled and that project is not already active,
//! the hook switches to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::json;
use tracing::{debug, info};

use devflow_core::config::hooks::ProjectSwitchConfig;
use devflow_core::config::paths::expand_home;

use super::context_cwd;
use crate::collaborators::registry::{ProjectRegistry, RegistrySnapshot};
use crate::collaborators::switcher::ProjectSwitcher;
use crate::error::{HookError, HookResult};
use crate::hooks::chain::{HookHandler, Next};
use crate::hooks::context::HookContext;

/// Context key holding the submitted prompt text.
pub const PROMPT_KEY: &str = "prompt";
/// Context key the resolved project id is written to.
pub const RESOLVED_PROJECT_KEY: &str = "resolved_project";
/// Context key set to `true` when this dispatch switched projects.
pub const PROJECT_SWITCHED_KEY: &str = "project_switched";

/// Registered project roots, longest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectIndex {
    roots: Vec<(PathBuf, String)>,
    auto_switch: Option<bool>,
}

impl ProjectIndex {
    /// Builds the index from a registry snapshot.
    pub fn from_snapshot(snapshot: &RegistrySnapshot) -> Self {
        let mut roots: Vec<(PathBuf, String)> = snapshot
            .projects
            .iter()
            .map(|(path, id)| (expand_home(path), id.clone()))
            .collect();
        roots.sort_by(|a, b| b.0.components().count().cmp(&a.0.components().count()));

        Self {
            roots,
            auto_switch: snapshot.settings.auto_switch_on_directory_change,
        }
    }

    /// Project whose root is `dir` or the deepest ancestor of `dir`.
    pub fn resolve(&self, dir: &Path) -> Option<(&Path, &str)> {
        self.roots
            .iter()
            .find(|(root, _)| dir.starts_with(root))
            .map(|(root, id)| (root.as_path(), id.as_str()))
    }

    /// Number of registered projects.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Whether the registry holds no projects.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Switches the active project when the user moves into another one.
pub struct ProjectResolverHook {
    registry: Arc<dyn ProjectRegistry>,
    switcher: Arc<dyn ProjectSwitcher>,
    auto_switch_default: bool,
    index: Cache<(), Arc<ProjectIndex>>,
}

impl ProjectResolverHook {
    /// Creates the hook.
    pub fn new(
        config: &ProjectSwitchConfig,
        registry: Arc<dyn ProjectRegistry>,
        switcher: Arc<dyn ProjectSwitcher>,
    ) -> Self {
        let index = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(config.cache_ttl_seconds))
            .build();

        Self {
            registry,
            switcher,
            auto_switch_default: config.auto_switch_on_directory_change,
            index,
        }
    }

    /// Drops the cached index; the next resolution re-reads the registry.
    pub fn clear_cache(&self) {
        self.index.invalidate_all();
        debug!("Project index cache cleared");
    }

    /// Returns the cached index, reading the registry if needed.
    ///
    /// A failed read is not cached, so the next call retries.
    pub async fn index(&self) -> HookResult<Arc<ProjectIndex>> {
        let registry = self.registry.clone();
        self.index
            .try_get_with((), async move {
                let snapshot = registry.load().await?;
                let index = ProjectIndex::from_snapshot(&snapshot);
                debug!(projects = index.len(), "Project index built");
                Ok::<_, HookError>(Arc::new(index))
            })
            .await
            .map_err(|e| HookError::Configuration(format!("Project registry unavailable: {e}")))
    }

    /// Resolves `dir` to `(project root, project id)`.
    pub async fn resolve(&self, dir: &Path) -> HookResult<Option<(PathBuf, String)>> {
        let index = self.index().await?;
        if let Some((root, id)) = index.resolve(dir) {
            return Ok(Some((root.to_path_buf(), id.to_string())));
        }

        // Registry roots may be recorded through a symlink-free path.
        let canonical = match tokio::fs::canonicalize(dir).await {
            Ok(canonical) => canonical,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(HookError::Resolution(format!(
                    "Cannot canonicalize '{}': {e}",
                    dir.display()
                )));
            }
        };
        Ok(index
            .resolve(&canonical)
            .map(|(root, id)| (root.to_path_buf(), id.to_string())))
    }

    /// First candidate directory that lies inside a registered project.
    ///
    /// Directories named in the prompt are tried before the caller's
    /// working directory; candidates outside every project are skipped.
    async fn target_project(
        &self,
        ctx: &HookContext,
    ) -> HookResult<Option<(PathBuf, PathBuf, String)>> {
        let mut candidates = match ctx.get_str(PROMPT_KEY) {
            Some(prompt) => prompt_directories(prompt).await,
            None => Vec::new(),
        };
        candidates.extend(context_cwd(ctx));

        for dir in candidates {
            if !is_dir(&dir).await {
                debug!(dir = %dir.display(), "Resolution directory does not exist");
                continue;
            }
            if let Some((root, project_id)) = self.resolve(&dir).await? {
                return Ok(Some((dir, root, project_id)));
            }
            debug!(dir = %dir.display(), "Directory is not inside a registered project");
        }
        Ok(None)
    }

    async fn resolve_and_switch(&self, ctx: &mut HookContext) -> HookResult<()> {
        let Some((dir, root, project_id)) = self.target_project(ctx).await? else {
            debug!("No registered project to resolve to");
            return Ok(());
        };
        ctx.set(RESOLVED_PROJECT_KEY, json!(project_id));

        let index = self.index().await?;
        if !index.auto_switch.unwrap_or(self.auto_switch_default) {
            debug!(project = %project_id, "Auto-switch disabled");
            return Ok(());
        }

        let current = self.switcher.current_project().await?;
        if current.as_deref() == Some(project_id.as_str()) {
            debug!(project = %project_id, "Directory already matches active project");
            return Ok(());
        }

        self.switcher.switch_project(&project_id, &dir).await?;
        ctx.set(PROJECT_SWITCHED_KEY, json!(true));

        info!(
            from = current.as_deref().unwrap_or("<none>"),
            to = %project_id,
            root = %root.display(),
            "Switched project on directory change"
        );
        Ok(())
    }
}

#[async_trait]
impl HookHandler for ProjectResolverHook {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        self.resolve_and_switch(ctx).await?;
        next.run(ctx).await;
        Ok(())
    }
}

/// Whitespace-separated tokens of `prompt` that are absolute (or `~/`)
/// paths to existing directories, in prompt order. The filesystem root
/// is never a candidate.
pub(crate) async fn prompt_directories(prompt: &str) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    for token in prompt.split_whitespace() {
        let token = token.trim_matches(|c: char| {
            matches!(c, '"' | '\'' | '`' | ',' | ';' | ':' | '(' | ')' | '.' | '!' | '?')
        });
        if !(token.starts_with('/') || token.starts_with("~/")) {
            continue;
        }
        let candidate = expand_home(token);
        if candidate.parent().is_none() {
            continue;
        }
        if is_dir(&candidate).await && !dirs.contains(&candidate) {
            dirs.push(candidate);
        }
    }
    dirs
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}
