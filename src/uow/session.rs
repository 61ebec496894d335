//! Session port contracts and transaction configuration.

use super::error::SessionError;
use crate::task::ports::TaskGateway;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Transaction isolation level requested when a transaction begins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    /// Statements see only data committed before they began.
    #[default]
    ReadCommitted,
    /// All statements see the snapshot taken at transaction start.
    RepeatableRead,
    /// Transactions behave as if executed serially.
    Serializable,
}

impl IsolationLevel {
    /// Returns the SQL spelling of the isolation level.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Session-level settings applied when a transaction begins.
///
/// The timeout bounds individual statements inside the transaction; it is
/// enforced by the storage session, not by the unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionConfig {
    /// Upper bound for any single statement in the transaction.
    pub timeout: Duration,
    /// Isolation level for the transaction.
    pub isolation: IsolationLevel,
}

impl TransactionConfig {
    /// Default statement timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            timeout: Self::DEFAULT_TIMEOUT,
            isolation: IsolationLevel::default(),
        }
    }
}

/// One transactional persistence session.
///
/// A session owns at most one open transaction at a time and is used
/// strictly sequentially; concurrent operations must open their own
/// sessions through a [`SessionFactory`].
#[async_trait]
pub trait TaskSession: Send {
    /// Opens a transaction on this session, applying its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backend cannot start a
    /// transaction.
    async fn begin(&mut self) -> Result<(), SessionError>;

    /// Commits the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the commit fails; the transaction
    /// state at the backend is then undefined and the session should be
    /// rolled back and closed.
    async fn commit(&mut self) -> Result<(), SessionError>;

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the rollback fails.
    async fn rollback(&mut self) -> Result<(), SessionError>;

    /// Releases the session and invalidates gateway handles bound to it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when releasing backend resources fails;
    /// callers treat this as advisory and may ignore it.
    async fn close(&mut self) -> Result<(), SessionError>;

    /// Returns the task gateway bound to this session.
    fn tasks(&self) -> Arc<dyn TaskGateway>;
}

/// Opens sessions against one storage backend.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Opens a fresh session with no transaction in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the backend is unreachable.
    async fn open(&self) -> Result<Box<dyn TaskSession>, SessionError>;
}
