//! Error types for task domain validation and state transitions.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {length} characters, maximum is {max}")]
    TitleTooLong {
        /// Character count of the trimmed title.
        length: usize,
        /// Maximum permitted character count.
        max: usize,
    },

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// The task description exceeds the maximum length.
    #[error("task description is {length} characters, maximum is {max}")]
    DescriptionTooLong {
        /// Character count of the trimmed description.
        length: usize,
        /// Maximum permitted character count.
        max: usize,
    },

    /// The owning user identifier is not a positive integer.
    #[error("invalid user id {0}, expected a positive integer")]
    InvalidUserId(i64),

    /// The requested status change is not in the transition table.
    #[error("invalid transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        /// Task the transition was attempted on.
        task_id: TaskId,
        /// Status the task currently holds.
        from: TaskStatus,
        /// Status the transition targeted.
        to: TaskStatus,
    },

    /// The task is already completed.
    #[error("task {task_id} is already completed, cannot {operation}")]
    AlreadyCompleted {
        /// Task the operation was attempted on.
        task_id: TaskId,
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The task reached a terminal status and rejects further mutation.
    #[error("task {task_id} is {status}, cannot {operation}")]
    AlreadyTerminal {
        /// Task the operation was attempted on.
        task_id: TaskId,
        /// Terminal status the task holds.
        status: TaskStatus,
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);
