//! Errors returned by engine operations.

use thiserror::Error;

use crate::types::{TaskId, TraceId, ValidationError};

/// Errors from session engine mutators.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// A value violated a model invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No scheduled block has this identifier.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// No trace has this identifier.
    #[error("trace not found: {0}")]
    TraceNotFound(TraceId),
}
