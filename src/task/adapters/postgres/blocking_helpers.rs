//! Blocking operation helpers for the `PostgreSQL` adapters.
//!
//! Synchronous Diesel operations are offloaded to a dedicated thread pool
//! so they never block the async executor. A session and the gateway
//! handle it exposes share one pooled connection through a slot; taking
//! the slot's connection away (on close) invalidates the gateway.

use diesel::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use std::sync::{Arc, Mutex};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Pooled connection type for internal use.
pub(super) type PooledConn = PooledConnection<ConnectionManager<PgConnection>>;

/// Connection slot shared between a session and its gateway handle.
pub(super) type ConnectionSlot = Arc<Mutex<Option<PooledConn>>>;

/// Runs a blocking task and maps join errors into the caller's error type.
pub(super) async fn run_blocking_with<F, T, E, M>(f: F, map_join_err: M) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
    M: FnOnce(tokio::task::JoinError) -> E,
{
    tokio::task::spawn_blocking(f).await.map_err(map_join_err)?
}

/// Runs a closure against the slot's open connection.
///
/// Fails through `map_unavailable` when the slot is empty (the session was
/// never begun, or already closed) or its lock is poisoned.
pub(super) fn with_connection<T, E, M, F>(
    slot: &ConnectionSlot,
    map_unavailable: M,
    f: F,
) -> Result<T, E>
where
    M: Fn(std::io::Error) -> E,
    F: FnOnce(&mut PgConnection) -> Result<T, E>,
{
    let mut guard = slot
        .lock()
        .map_err(|err| map_unavailable(std::io::Error::other(err.to_string())))?;
    let connection = guard.as_mut().ok_or_else(|| {
        map_unavailable(std::io::Error::other("session has no open connection"))
    })?;
    f(connection)
}
