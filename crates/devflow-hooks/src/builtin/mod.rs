//! Built-in hooks.
//!
//! Each hook owns its private state (backups on disk, the project index
//! cache, the suggestion throttle map, file fingerprints). Nothing outside
//! the hook touches that state except through the hook's own methods.

pub mod backup;
pub mod critical_review;
pub mod project_resolver;
pub mod suggestions;
pub mod switch_audit;

use std::path::PathBuf;

use crate::hooks::context::HookContext;

pub use backup::{BackupEntry, BackupKind, ConfigBackupHook, RestoreReport};
pub use critical_review::{CriticalReviewHook, ReviewOutcome, fingerprint};
pub use project_resolver::{ProjectIndex, ProjectResolverHook};
pub use suggestions::{
    MatchFlags, ScoredSuggestion, SuggestionCandidate, SuggestionHook, SuggestionThrottle, rank,
    score,
};
pub use switch_audit::SwitchAuditHook;

/// Context key holding the caller's working directory.
pub const CWD_KEY: &str = "cwd";

/// Reads a path from the context, resolving relative paths against the
/// context's `cwd` when present.
pub(crate) fn resolve_context_path(ctx: &HookContext, key: &str) -> Option<PathBuf> {
    let path = ctx.get_path(key)?;
    if path.is_relative() {
        if let Some(cwd) = ctx.get_path(CWD_KEY) {
            return Some(cwd.join(path));
        }
    }
    Some(path)
}

/// The caller's working directory: the context's `cwd`, else the process's.
pub(crate) fn context_cwd(ctx: &HookContext) -> Option<PathBuf> {
    ctx.get_path(CWD_KEY)
        .or_else(|| std::env::current_dir().ok())
}
