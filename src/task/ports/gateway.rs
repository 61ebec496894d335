//! Gateway port for task persistence and owner-scoped lookup.

use crate::task::domain::{Task, TaskId};
use crate::user::domain::UserId;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task gateway operations.
pub type TaskGatewayResult<T> = Result<T, TaskGatewayError>;

/// Task persistence contract.
///
/// Implementations are bound to one transactional session; a handle
/// obtained from a closed session fails every operation.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Saves a new task or updates an existing one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError`] when the storage backend rejects the
    /// write.
    async fn save(&self, task: &Task) -> TaskGatewayResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError`] when the lookup fails.
    async fn find_by_id(&self, id: TaskId) -> TaskGatewayResult<Option<Task>>;

    /// Returns all tasks owned by the given user, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError`] when the lookup fails.
    async fn find_by_user(&self, user_id: UserId) -> TaskGatewayResult<Vec<Task>>;

    /// Counts the tasks owned by the given user.
    ///
    /// # Errors
    ///
    /// Returns [`TaskGatewayError`] when the count fails.
    async fn count_by_user(&self, user_id: UserId) -> TaskGatewayResult<u64>;
}

/// Failure category expected to clear on retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKind {
    /// The backend did not answer within the session timeout.
    Timeout,
    /// The connection to the backend was lost.
    Disconnected,
}

impl TransientKind {
    /// Returns the canonical label for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for TransientKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors returned by task gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskGatewayError {
    /// A failure expected to succeed on retry without changing inputs.
    #[error("transient storage failure ({kind}): {source}")]
    Transient {
        /// Transient failure category.
        kind: TransientKind,
        /// Underlying backend error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Non-transient persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskGatewayError {
    /// Wraps a non-transient persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a transient error of the given kind.
    pub fn transient(
        kind: TransientKind,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transient {
            kind,
            source: Arc::new(err),
        }
    }

    /// Returns whether retrying the operation may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
