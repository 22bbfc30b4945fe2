//! Error types for queue domain validation and parsing.

use super::TaskId;
use thiserror::Error;

/// Errors returned while constructing or transitioning domain queue values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueueDomainError {
    /// The task type is empty after trimming.
    #[error("task type must not be empty")]
    EmptyTaskType,

    /// A cancel was attempted on a record no longer pending.
    #[error("Task is in progress and can't be canceled [uuid={0}]")]
    CancelInProgress(TaskId),

    /// A failure was recorded against a record that was never claimed.
    #[error("Task is not in-progress and can't be marked as failed [uuid={0}]")]
    FailNotInProgress(TaskId),

    /// A success was recorded against a record that was never claimed.
    #[error("Task is not in-progress and can't be marked as completed [uuid={0}]")]
    CompleteNotInProgress(TaskId),
}

/// Error returned while parsing queue statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing activity statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity status: {0}")]
pub struct ParseActivityStatusError(pub String);
