//! `PostgreSQL` transactional sessions.
//!
//! A session owns one pooled connection for its lifetime, drives the
//! transaction with explicit `BEGIN`/`COMMIT`/`ROLLBACK` statements, and
//! applies the transaction configuration (isolation level, statement
//! timeout) when the transaction begins. The gateway handle shares the
//! session's connection, so gateway writes participate in the open
//! transaction.

use super::blocking_helpers::{ConnectionSlot, TaskPgPool, run_blocking_with, with_connection};
use super::gateway::PostgresTaskGateway;
use crate::task::ports::{TaskGateway, TransientKind};
use crate::uow::{SessionError, SessionFactory, TaskSession, TransactionConfig};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::{Arc, Mutex};

/// Classifies Diesel errors the retry policy may retry.
///
/// Closed connections and statement timeouts are transient; everything
/// else, constraint violations included, is not.
pub(super) fn classify_storage_error(err: &DieselError) -> Option<TransientKind> {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            Some(TransientKind::Disconnected)
        }
        DieselError::DatabaseError(_, info)
            if info.message().contains("statement timeout") =>
        {
            Some(TransientKind::Timeout)
        }
        _ => None,
    }
}

/// Maps a Diesel error into a session error, preserving transience.
fn session_storage_error(err: DieselError) -> SessionError {
    match classify_storage_error(&err) {
        Some(kind) => SessionError::transient(kind, err),
        None => SessionError::persistence(err),
    }
}

/// Opens `PostgreSQL` sessions from a shared connection pool.
#[derive(Debug, Clone)]
pub struct PostgresSessionFactory {
    pool: TaskPgPool,
    config: TransactionConfig,
}

impl PostgresSessionFactory {
    /// Creates a factory with the default transaction configuration.
    #[must_use]
    pub fn new(pool: TaskPgPool) -> Self {
        Self {
            pool,
            config: TransactionConfig::default(),
        }
    }

    /// Creates a factory with an explicit transaction configuration.
    #[must_use]
    pub const fn with_config(pool: TaskPgPool, config: TransactionConfig) -> Self {
        Self { pool, config }
    }
}

#[async_trait]
impl SessionFactory for PostgresSessionFactory {
    async fn open(&self) -> Result<Box<dyn TaskSession>, SessionError> {
        Ok(Box::new(PostgresTaskSession::new(
            self.pool.clone(),
            self.config,
        )))
    }
}

/// One `PostgreSQL` session owning at most one pooled connection.
pub struct PostgresTaskSession {
    pool: TaskPgPool,
    config: TransactionConfig,
    connection: ConnectionSlot,
    gateway: Arc<PostgresTaskGateway>,
}

impl std::fmt::Debug for PostgresTaskSession {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("PostgresTaskSession")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PostgresTaskSession {
    /// Creates a session that will draw a connection from the pool on
    /// `begin`.
    #[must_use]
    pub fn new(pool: TaskPgPool, config: TransactionConfig) -> Self {
        let connection: ConnectionSlot = Arc::new(Mutex::new(None));
        let gateway = Arc::new(PostgresTaskGateway::new(Arc::clone(&connection)));
        Self {
            pool,
            config,
            connection,
            gateway,
        }
    }

    async fn run_transaction_statement(&self, sql: &'static str) -> Result<(), SessionError> {
        let slot = Arc::clone(&self.connection);
        run_blocking_with(
            move || {
                with_connection(
                    &slot,
                    |err| SessionError::persistence(err),
                    |connection| {
                        diesel::sql_query(sql)
                            .execute(connection)
                            .map(|_| ())
                            .map_err(session_storage_error)
                    },
                )
            },
            SessionError::persistence,
        )
        .await
    }
}

fn start_transaction(
    connection: &mut PgConnection,
    config: TransactionConfig,
) -> Result<(), SessionError> {
    diesel::sql_query("BEGIN")
        .execute(connection)
        .map_err(session_storage_error)?;
    diesel::sql_query(format!(
        "SET TRANSACTION ISOLATION LEVEL {}",
        config.isolation.as_sql()
    ))
    .execute(connection)
    .map_err(session_storage_error)?;
    diesel::sql_query(format!(
        "SET LOCAL statement_timeout = {}",
        config.timeout.as_millis()
    ))
    .execute(connection)
    .map_err(session_storage_error)?;
    Ok(())
}

#[async_trait]
impl TaskSession for PostgresTaskSession {
    async fn begin(&mut self) -> Result<(), SessionError> {
        let pool = self.pool.clone();
        let slot = Arc::clone(&self.connection);
        let config = self.config;
        run_blocking_with(
            move || {
                let mut connection = pool
                    .get()
                    .map_err(|err| SessionError::transient(TransientKind::Timeout, err))?;
                start_transaction(&mut connection, config)?;
                let mut guard = slot
                    .lock()
                    .map_err(|err| {
                        SessionError::persistence(std::io::Error::other(err.to_string()))
                    })?;
                *guard = Some(connection);
                Ok(())
            },
            SessionError::persistence,
        )
        .await
    }

    async fn commit(&mut self) -> Result<(), SessionError> {
        self.run_transaction_statement("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), SessionError> {
        self.run_transaction_statement("ROLLBACK").await
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        let slot = Arc::clone(&self.connection);
        run_blocking_with(
            move || {
                let mut guard = slot
                    .lock()
                    .map_err(|err| {
                        SessionError::persistence(std::io::Error::other(err.to_string()))
                    })?;
                // Dropping the pooled connection returns it to the pool.
                *guard = None;
                Ok(())
            },
            SessionError::persistence,
        )
        .await
    }

    fn tasks(&self) -> Arc<dyn TaskGateway> {
        Arc::clone(&self.gateway) as Arc<dyn TaskGateway>
    }
}
