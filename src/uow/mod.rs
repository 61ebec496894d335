//! Unit of Work transaction boundary.
//!
//! A [`UnitOfWork`] binds exactly one persistence session to exactly one
//! logical operation: one `begin`, one `commit` or `rollback`, one `close`.
//! The [`UnitOfWork::run_scoped`] helper enforces that contract on every
//! exit path, and [`UnitOfWork::execute_with_retry`] retries transient
//! storage failures with exponential backoff, resetting the transaction
//! between attempts. Sessions are obtained from a [`SessionFactory`] port
//! implemented by the storage adapters.

mod error;
mod retry;
mod session;
mod unit_of_work;

pub use error::{SessionError, UnitOfWorkError, UnitOfWorkResult};
pub use retry::{RetryPolicy, Transient};
pub use session::{IsolationLevel, SessionFactory, TaskSession, TransactionConfig};
pub use unit_of_work::{ScopedFuture, UnitOfWork, UowState};

#[cfg(test)]
mod tests;
