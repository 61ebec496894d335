//! Unit of Work state machine and scoped transaction helpers.

use super::error::{UnitOfWorkError, UnitOfWorkResult};
use super::retry::{RetryPolicy, Transient};
use super::session::{SessionFactory, TaskSession};
use crate::task::ports::TaskGateway;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Future returned by scoped unit-of-work operations.
pub type ScopedFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Lifecycle state of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UowState {
    /// No transaction in flight; `begin` is permitted.
    Idle,
    /// A transaction is open.
    Active,
    /// The transaction committed; `close` returns the instance to idle.
    Committed,
    /// The transaction rolled back; `close` returns the instance to idle.
    RolledBack,
}

impl UowState {
    /// Returns the canonical label for log output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
        }
    }
}

impl fmt::Display for UowState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Transaction boundary owning one session for one logical operation.
///
/// Exactly one of `commit` or `rollback` happens per successfully begun
/// transaction, and `close` always happens, regardless of where an error
/// originates. [`Self::run_scoped`] packages that contract; the individual
/// methods remain available for callers that manage the lifecycle by hand.
pub struct UnitOfWork {
    sessions: Arc<dyn SessionFactory>,
    session: Option<Box<dyn TaskSession>>,
    state: UowState,
    retry: RetryPolicy,
}

impl UnitOfWork {
    /// Creates an idle unit of work drawing sessions from the factory.
    #[must_use]
    pub fn new(sessions: Arc<dyn SessionFactory>) -> Self {
        Self {
            sessions,
            session: None,
            state: UowState::Idle,
            retry: RetryPolicy::default(),
        }
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> UowState {
        self.state
    }

    /// Opens a session and begins a transaction on it.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::AlreadyActive`] unless the unit of work
    /// is idle, and [`UnitOfWorkError::Session`] when the backend cannot
    /// start a transaction (the session is released before returning).
    pub async fn begin(&mut self) -> UnitOfWorkResult<()> {
        if self.state != UowState::Idle {
            return Err(UnitOfWorkError::AlreadyActive);
        }

        let mut session = self.sessions.open().await?;
        if let Err(begin_err) = session.begin().await {
            if let Err(close_err) = session.close().await {
                debug!(error = %close_err, "failed to release session after begin failure");
            }
            return Err(begin_err.into());
        }

        self.session = Some(session);
        self.state = UowState::Active;
        debug!("transaction started");
        Ok(())
    }

    /// Returns the task gateway bound to the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoActiveTransaction`] when no
    /// transaction is open.
    pub fn tasks(&self) -> UnitOfWorkResult<Arc<dyn TaskGateway>> {
        if self.state != UowState::Active {
            return Err(UnitOfWorkError::NoActiveTransaction {
                operation: "task gateway access",
            });
        }
        self.session
            .as_ref()
            .map(|session| session.tasks())
            .ok_or(UnitOfWorkError::NoActiveTransaction {
                operation: "task gateway access",
            })
    }

    /// Commits the open transaction.
    ///
    /// A failed commit is rolled back before the error propagates; the
    /// rollback's own failure is logged and swallowed.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoActiveTransaction`] when no
    /// transaction is open and [`UnitOfWorkError::Session`] when the
    /// commit fails.
    pub async fn commit(&mut self) -> UnitOfWorkResult<()> {
        let session = self.active_session("commit")?;
        if let Err(commit_err) = session.commit().await {
            if let Err(rollback_err) = session.rollback().await {
                warn!(error = %rollback_err, "rollback after failed commit failed");
            }
            self.state = UowState::RolledBack;
            return Err(commit_err.into());
        }
        self.state = UowState::Committed;
        debug!("transaction committed");
        Ok(())
    }

    /// Rolls back the open transaction.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoActiveTransaction`] when no
    /// transaction is open and [`UnitOfWorkError::Session`] when the
    /// rollback fails.
    pub async fn rollback(&mut self) -> UnitOfWorkResult<()> {
        let session = self.active_session("rollback")?;
        session.rollback().await?;
        self.state = UowState::RolledBack;
        debug!("transaction rolled back");
        Ok(())
    }

    /// Releases the session and returns the unit of work to idle.
    ///
    /// Always safe to call, in any state, any number of times. Failures
    /// while releasing backend resources are logged and swallowed.
    pub async fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(close_err) = session.close().await {
                warn!(error = %close_err, "error closing session");
            }
            debug!("session closed");
        }
        self.state = UowState::Idle;
    }

    /// Runs one operation inside a transaction scope.
    ///
    /// Begins a transaction, runs the operation with access to this unit
    /// of work, then commits on success or rolls back on failure, closing
    /// the session on every path. Rollback failures are logged and
    /// swallowed so the operation's own error propagates.
    ///
    /// # Errors
    ///
    /// Returns the operation's error, or the begin/commit failure
    /// converted through `E`.
    pub async fn run_scoped<T, E, F>(&mut self, operation: F) -> Result<T, E>
    where
        E: From<UnitOfWorkError>,
        F: for<'a> FnOnce(&'a mut Self) -> ScopedFuture<'a, T, E>,
    {
        self.begin().await.map_err(E::from)?;
        match operation(&mut *self).await {
            Ok(value) => {
                let committed = self.commit().await;
                self.close().await;
                committed.map_err(E::from)?;
                Ok(value)
            }
            Err(operation_err) => {
                if let Err(rollback_err) = self.rollback().await {
                    warn!(error = %rollback_err, "rollback failed after operation error");
                }
                self.close().await;
                Err(operation_err)
            }
        }
    }

    /// Runs an operation inside the open transaction, retrying transient
    /// failures.
    ///
    /// On a transient failure the transaction is reset (rollback, close,
    /// begin) and the operation retried after an exponential backoff, up
    /// to [`RetryPolicy::max_retries`] retries. Non-transient failures
    /// propagate immediately without a retry.
    ///
    /// # Errors
    ///
    /// Returns [`UnitOfWorkError::NoActiveTransaction`] when called
    /// without an open transaction, the operation's own non-transient
    /// error, or [`UnitOfWorkError::RetryExhausted`] wrapping the last
    /// transient failure.
    pub async fn execute_with_retry<T, E, F>(&mut self, mut operation: F) -> Result<T, E>
    where
        E: Transient + std::error::Error + Send + Sync + From<UnitOfWorkError> + 'static,
        F: for<'a> FnMut(&'a mut Self) -> ScopedFuture<'a, T, E>,
    {
        if self.state != UowState::Active {
            return Err(E::from(UnitOfWorkError::NoActiveTransaction {
                operation: "execute_with_retry",
            }));
        }

        let policy = self.retry;
        let mut attempt: u32 = 0;
        loop {
            match operation(&mut *self).await {
                Ok(value) => return Ok(value),
                Err(transient_err) if transient_err.is_transient() => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = policy.max_retries,
                        error = %transient_err,
                        "transient error in transaction",
                    );
                    if attempt >= policy.max_retries {
                        error!(
                            attempts = attempt + 1,
                            error = %transient_err,
                            "retry attempts exhausted",
                        );
                        return Err(E::from(UnitOfWorkError::RetryExhausted {
                            attempts: attempt + 1,
                            source: Arc::new(transient_err),
                        }));
                    }
                    tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                    self.reset_for_retry().await;
                    attempt += 1;
                }
                Err(fatal_err) => return Err(fatal_err),
            }
        }
    }

    /// Rolls back and reopens the transaction between retry attempts.
    ///
    /// Failures here are logged and swallowed; a session left unusable
    /// surfaces through the retried operation itself.
    async fn reset_for_retry(&mut self) {
        if let Err(rollback_err) = self.rollback().await {
            debug!(error = %rollback_err, "rollback during retry reset failed");
        }
        self.close().await;
        if let Err(begin_err) = self.begin().await {
            warn!(error = %begin_err, "failed to reopen transaction during retry reset");
        }
    }

    fn active_session(
        &mut self,
        operation: &'static str,
    ) -> UnitOfWorkResult<&mut Box<dyn TaskSession>> {
        if self.state != UowState::Active {
            return Err(UnitOfWorkError::NoActiveTransaction { operation });
        }
        self.session
            .as_mut()
            .ok_or(UnitOfWorkError::NoActiveTransaction { operation })
    }
}

impl fmt::Debug for UnitOfWork {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("UnitOfWork")
            .field("state", &self.state)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
