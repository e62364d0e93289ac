//! Convenience result type alias for FormGate.

use crate::error::AppError;

/// A specialized `Result` type for FormGate operations.
pub type AppResult<T> = Result<T, AppError>;
