//! In-memory transactional sessions over the shared task store.

use super::store::{InMemoryTaskGateway, InMemoryTaskStore};
use crate::task::ports::TaskGateway;
use crate::uow::{SessionError, SessionFactory, TaskSession};
use async_trait::async_trait;
use std::sync::Arc;

/// Opens in-memory sessions sharing one committed store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionFactory {
    store: InMemoryTaskStore,
}

impl InMemorySessionFactory {
    /// Creates a factory over the given store.
    #[must_use]
    pub const fn new(store: InMemoryTaskStore) -> Self {
        Self { store }
    }

    /// Returns the shared committed store.
    #[must_use]
    pub const fn store(&self) -> &InMemoryTaskStore {
        &self.store
    }
}

#[async_trait]
impl SessionFactory for InMemorySessionFactory {
    async fn open(&self) -> Result<Box<dyn TaskSession>, SessionError> {
        Ok(Box::new(InMemoryTaskSession::new(&self.store)))
    }
}

/// One in-memory session with a staged-write overlay.
#[derive(Debug)]
pub struct InMemoryTaskSession {
    gateway: Arc<InMemoryTaskGateway>,
}

impl InMemoryTaskSession {
    /// Creates a session against the given store.
    #[must_use]
    pub fn new(store: &InMemoryTaskStore) -> Self {
        Self {
            gateway: Arc::new(InMemoryTaskGateway::new(store.shared())),
        }
    }
}

#[async_trait]
impl TaskSession for InMemoryTaskSession {
    async fn begin(&mut self) -> Result<(), SessionError> {
        self.gateway.mark_open().map_err(SessionError::persistence)
    }

    async fn commit(&mut self) -> Result<(), SessionError> {
        self.gateway
            .apply_staged()
            .map_err(SessionError::persistence)
    }

    async fn rollback(&mut self) -> Result<(), SessionError> {
        self.gateway
            .discard_staged()
            .map_err(SessionError::persistence)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.gateway
            .mark_closed()
            .map_err(SessionError::persistence)
    }

    fn tasks(&self) -> Arc<dyn TaskGateway> {
        Arc::clone(&self.gateway) as Arc<dyn TaskGateway>
    }
}
