//! Change-triggered critical review (`POST_TOOL_USE` / `USER_PROMPT_SUBMIT`).
//!
//! A monitored file is fingerprinted on every dispatch. The external
//! evaluation runs only when the feature is enabled, the fingerprint
//! differs from the stored one (or none is stored yet), and at least
//! `throttle_ms` passed since the previous run. A failed evaluation still stores the new
//! fingerprint so unchanged content is not retried forever.
//!
//! The fingerprint is `len-first100-last100`, so an edit confined to the
//! middle of the file that keeps its length goes unnoticed.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use devflow_core::config::hooks::CriticalReviewConfig;

use super::context_cwd;
use crate::collaborators::evaluator::{EvaluationReport, Evaluator};
use crate::error::{HookError, HookResult};
use crate::hooks::chain::{HookHandler, Next};
use crate::hooks::context::HookContext;

/// Context key the review outcome is written to.
pub const CRITICAL_REVIEW_KEY: &str = "critical_review";

const EDGE_CHARS: usize = 100;

/// Cheap content fingerprint: `"{len}-{first 100 chars}-{last 100 chars}"`.
pub fn fingerprint(content: &str) -> String {
    let len = content.chars().count();
    let head: String = content.chars().take(EDGE_CHARS).collect();
    let tail: String = content.chars().skip(len.saturating_sub(EDGE_CHARS)).collect();
    format!("{len}-{head}-{tail}")
}

/// What a check decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    /// The feature is turned off.
    Disabled,
    /// The monitored file does not exist.
    Missing,
    /// Content fingerprint unchanged.
    Unchanged,
    /// Changed, but the previous run was too recent.
    Throttled {
        /// Time left until the next run is allowed.
        remaining_ms: u64,
    },
    /// The evaluation ran successfully.
    Ran {
        /// Captured evaluation output.
        report: EvaluationReport,
    },
    /// The evaluation ran and failed; the failure was logged.
    Failed {
        /// Why it failed.
        reason: String,
    },
}

#[derive(Debug, Clone)]
struct WatchState {
    fingerprint: String,
    last_run: Option<Instant>,
}

/// Runs the external evaluation when the monitored file changes.
pub struct CriticalReviewHook {
    enabled: bool,
    monitored_file: PathBuf,
    throttle: Duration,
    evaluator: Arc<dyn Evaluator>,
    state: Mutex<HashMap<PathBuf, WatchState>>,
}

impl CriticalReviewHook {
    /// Creates the hook from its configuration section.
    pub fn new(config: &CriticalReviewConfig, evaluator: Arc<dyn Evaluator>) -> Self {
        Self {
            enabled: config.enable_critical_review,
            monitored_file: PathBuf::from(&config.monitored_file),
            throttle: Duration::from_millis(config.throttle_ms),
            evaluator,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// The monitored file, resolved against `cwd` when relative.
    pub fn monitored_path(&self, cwd: Option<&Path>) -> PathBuf {
        match cwd {
            Some(cwd) if self.monitored_file.is_relative() => cwd.join(&self.monitored_file),
            _ => self.monitored_file.clone(),
        }
    }

    /// Checks `file` now.
    pub async fn check(&self, file: &Path) -> HookResult<ReviewOutcome> {
        self.check_at(file, Instant::now()).await
    }

    /// Checks `file` as if the current time were `now`.
    pub async fn check_at(&self, file: &Path, now: Instant) -> HookResult<ReviewOutcome> {
        if !self.enabled {
            return Ok(ReviewOutcome::Disabled);
        }

        let bytes = match tokio::fs::read(file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(file = %file.display(), "Monitored file absent");
                return Ok(ReviewOutcome::Missing);
            }
            Err(e) => {
                return Err(HookError::io(
                    format!("Failed to read '{}'", file.display()),
                    e,
                ));
            }
        };
        let content = String::from_utf8_lossy(&bytes);
        let current = fingerprint(&content);

        {
            let state = self.state.lock().await;
            // A file seen for the first time counts as changed.
            if let Some(watch) = state.get(file) {
                if watch.fingerprint == current {
                    return Ok(ReviewOutcome::Unchanged);
                }

                if let Some(last_run) = watch.last_run {
                    let elapsed = now.saturating_duration_since(last_run);
                    if elapsed < self.throttle {
                        let remaining_ms = (self.throttle - elapsed).as_millis() as u64;
                        debug!(file = %file.display(), remaining_ms, "Review throttled");
                        return Ok(ReviewOutcome::Throttled { remaining_ms });
                    }
                }
            }
        }

        // The lock is not held while the evaluation runs.
        let result = self.evaluator.evaluate(file).await;

        let mut state = self.state.lock().await;
        let watch = state.entry(file.to_path_buf()).or_insert_with(|| WatchState {
            fingerprint: String::new(),
            last_run: None,
        });
        watch.fingerprint = current;

        match result {
            Ok(report) => {
                watch.last_run = Some(now);
                info!(
                    file = %file.display(),
                    duration_ms = report.duration_ms,
                    "Critical review completed"
                );
                Ok(ReviewOutcome::Ran { report })
            }
            Err(err) => {
                error!(
                    file = %file.display(),
                    reason = %err,
                    "Critical review failed"
                );
                Ok(ReviewOutcome::Failed {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Forgets all stored fingerprints and run times.
    pub async fn reset(&self) {
        self.state.lock().await.clear();
    }
}

#[async_trait]
impl HookHandler for CriticalReviewHook {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        if self.enabled {
            let file = self.monitored_path(context_cwd(ctx).as_deref());
            let outcome = self.check(&file).await?;
            ctx.set_serialized(CRITICAL_REVIEW_KEY, &outcome)?;
        }

        next.run(ctx).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_short_content() {
        assert_eq!(fingerprint("abc"), "3-abc-abc");
        assert_eq!(fingerprint(""), "0--");
    }

    #[test]
    fn test_fingerprint_long_content_uses_edges() {
        let content = format!("{}{}{}", "a".repeat(100), "m".repeat(50), "z".repeat(100));
        let fp = fingerprint(&content);
        assert_eq!(fp, format!("250-{}-{}", "a".repeat(100), "z".repeat(100)));
    }

    #[test]
    fn test_fingerprint_misses_same_length_middle_edit() {
        let before = format!("{}{}{}", "a".repeat(100), "x".repeat(10), "z".repeat(100));
        let after = format!("{}{}{}", "a".repeat(100), "y".repeat(10), "z".repeat(100));
        assert_eq!(fingerprint(&before), fingerprint(&after));
    }

    #[test]
    fn test_fingerprint_counts_characters() {
        assert_eq!(fingerprint("é"), "1-é-é");
    }
}
