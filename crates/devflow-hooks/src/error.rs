//! Error type for the hook engine and the built-in hooks.
//!
//! Handler errors never reach a `dispatch` caller: they are contained by
//! [`FailOpen`](crate::FailOpen) or by the manager and only logged. The
//! type still maps cleanly into `devflow_core::AppError` for the direct
//! operations (registration, restore) that do return errors.

use std::path::PathBuf;

use devflow_core::error::AppError;
use thiserror::Error;

use crate::hooks::definitions::HookType;

/// Errors raised by hook registration and by hook handlers.
#[derive(Debug, Error)]
pub enum HookError {
    /// A handler with this name is already registered for the hook type.
    #[error("Hook '{name}' is already registered for {hook}")]
    DuplicateName {
        /// Hook type of the existing registration.
        hook: HookType,
        /// The conflicting name.
        name: String,
    },

    /// The backup to restore from does not exist.
    #[error("Backup not found: {}", path.display())]
    BackupNotFound {
        /// The requested backup path.
        path: PathBuf,
    },

    /// A toggle, the registry, or a context value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A filesystem operation failed.
    #[error("{context}: {source}")]
    Io {
        /// What was being attempted.
        context: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A directory could not be mapped to a project.
    #[error("Resolution error: {0}")]
    Resolution(String),

    /// The evaluation process exited unsuccessfully.
    #[error("External process exited with code {code}: {stderr}")]
    ExternalProcess {
        /// Exit code, `-1` when terminated by a signal.
        code: i32,
        /// Captured standard error (truncated).
        stderr: String,
    },

    /// The evaluation process did not finish in time.
    #[error("External process timed out after {seconds}s")]
    ProcessTimeout {
        /// The timeout that was exceeded.
        seconds: u64,
    },

    /// A handler failed for another reason.
    #[error("{0}")]
    Handler(String),
}

impl HookError {
    /// Builds an [`HookError::Io`] with a description of the attempted operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for HookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(format!("Invalid JSON: {err}"))
    }
}

impl From<HookError> for AppError {
    fn from(err: HookError) -> Self {
        match &err {
            HookError::DuplicateName { .. } => AppError::conflict(err.to_string()),
            HookError::BackupNotFound { .. } => AppError::not_found(err.to_string()),
            HookError::Configuration(_) => AppError::configuration(err.to_string()),
            HookError::Io { .. } => AppError::io(err.to_string()),
            HookError::Resolution(_) => AppError::resolution(err.to_string()),
            HookError::ExternalProcess { .. } | HookError::ProcessTimeout { .. } => {
                AppError::external_process(err.to_string())
            }
            HookError::Handler(_) => AppError::internal(err.to_string()),
        }
    }
}

/// Result alias for hook operations.
pub type HookResult<T> = Result<T, HookError>;
