//! Error types for sessions and the unit of work.

use crate::task::ports::TransientKind;
use std::sync::Arc;
use thiserror::Error;

/// Result type for unit-of-work operations.
pub type UnitOfWorkResult<T> = Result<T, UnitOfWorkError>;

/// Errors raised by session implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// A failure expected to succeed on retry without changing inputs.
    #[error("transient session failure ({kind}): {source}")]
    Transient {
        /// Transient failure category.
        kind: TransientKind,
        /// Underlying backend error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Non-transient session failure.
    #[error("session failure: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionError {
    /// Wraps a non-transient session error.
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
}

/// Errors raised by the unit of work itself.
#[derive(Debug, Clone, Error)]
pub enum UnitOfWorkError {
    /// `begin` was called while a transaction lifecycle was in flight.
    #[error("transaction is already active")]
    AlreadyActive,

    /// An operation requiring an open transaction ran without one.
    #[error("no active transaction for {operation}")]
    NoActiveTransaction {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// The underlying session failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A retried operation kept failing transiently.
    #[error("operation failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of times the operation was invoked.
        attempts: u32,
        /// The last transient failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}
