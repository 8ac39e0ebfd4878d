//! Out-of-process evaluation run by the critical-review hook.
//!
//! The evaluation is a child process with captured output and a hard
//! timeout; the manager itself never bounds a dispatch, so the bound
//! lives here.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{error, info};

use devflow_core::config::hooks::CriticalReviewConfig;

use crate::error::{HookError, HookResult};

/// Captured result of a successful evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Exit code of the process.
    pub exit_code: Option<i32>,
    /// Standard output (truncated).
    pub stdout: String,
    /// Wall-clock duration.
    pub duration_ms: u64,
}

/// Runs an evaluation of a changed file.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Evaluates `file`. Non-zero exit and timeouts are errors.
    async fn evaluate(&self, file: &Path) -> HookResult<EvaluationReport>;
}

const MAX_CAPTURED_CHARS: usize = 2000;

/// Evaluator that spawns an external command.
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    command: String,
    args: Vec<String>,
    timeout: Duration,
    working_dir: Option<PathBuf>,
}

impl CommandEvaluator {
    /// Creates an evaluator. `{file}` in `args` is replaced by the file path.
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            timeout,
            working_dir: None,
        }
    }

    /// Creates an evaluator from the critical-review configuration.
    pub fn from_config(config: &CriticalReviewConfig) -> Self {
        Self::new(
            config.command.clone(),
            config.args.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Runs the command in `dir` instead of the process working directory.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Substitutes the `{file}` and `{dir}` placeholders.
    pub fn substitute_args(&self, file: &Path) -> Vec<String> {
        let file_str = file.to_string_lossy();
        let dir_str = file
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        self.args
            .iter()
            .map(|arg| arg.replace("{file}", &file_str).replace("{dir}", &dir_str))
            .collect()
    }
}

#[async_trait]
impl Evaluator for CommandEvaluator {
    async fn evaluate(&self, file: &Path) -> HookResult<EvaluationReport> {
        let start = Instant::now();
        let args = self.substitute_args(file);

        info!(
            command = %self.command,
            file = %file.display(),
            "Running evaluation"
        );

        let mut cmd = Command::new(&self.command);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(HookError::io(
                    format!("Failed to run '{}'", self.command),
                    e,
                ));
            }
            Err(_) => {
                error!(
                    command = %self.command,
                    timeout_secs = self.timeout.as_secs(),
                    "Evaluation timed out"
                );
                return Err(HookError::ProcessTimeout {
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(HookError::ExternalProcess {
                code: output.status.code().unwrap_or(-1),
                stderr: stderr.chars().take(MAX_CAPTURED_CHARS).collect(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        info!(command = %self.command, duration_ms, "Evaluation completed");

        Ok(EvaluationReport {
            exit_code: output.status.code(),
            stdout: stdout.chars().take(MAX_CAPTURED_CHARS).collect(),
            duration_ms,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_args() {
        let evaluator = CommandEvaluator::new(
            "review",
            vec!["--file={file}".to_string(), "{dir}".to_string()],
            Duration::from_secs(1),
        );
        let args = evaluator.substitute_args(Path::new("/work/app/TODO.md"));
        assert_eq!(args, vec!["--file=/work/app/TODO.md", "/work/app"]);
    }

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let evaluator = CommandEvaluator::new(
            "sh",
            vec!["-c".to_string(), "echo reviewed {file}".to_string()],
            Duration::from_secs(10),
        );
        let report = evaluator.evaluate(Path::new("notes.md")).await.unwrap();
        assert_eq!(report.exit_code, Some(0));
        assert_eq!(report.stdout.trim(), "reviewed notes.md");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_captured() {
        let evaluator = CommandEvaluator::new(
            "sh",
            vec!["-c".to_string(), "echo bad >&2; exit 3".to_string()],
            Duration::from_secs(10),
        );
        let err = evaluator.evaluate(Path::new("notes.md")).await.unwrap_err();
        match err {
            HookError::ExternalProcess { code, stderr } => {
                assert_eq!(code, 3);
                assert_eq!(stderr.trim(), "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let evaluator = CommandEvaluator::new(
            "sh",
            vec!["-c".to_string(), "sleep 5".to_string()],
            Duration::from_millis(100),
        );
        let err = evaluator.evaluate(Path::new("notes.md")).await.unwrap_err();
        assert!(matches!(err, HookError::ProcessTimeout { .. }));
    }
}
