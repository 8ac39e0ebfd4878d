//! Convenience result type alias for Devflow.

use crate::error::AppError;

/// A specialized `Result` type for Devflow operations.
pub type AppResult<T> = Result<T, AppError>;
