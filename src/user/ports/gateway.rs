//! Gateway port for read-only user lookup.

use crate::user::domain::{User, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user gateway operations.
pub type UserGatewayResult<T> = Result<T, UserGatewayError>;

/// Read-only user lookup contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Finds a user by identifier.
    ///
    /// Returns `None` when the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`UserGatewayError`] when the lookup fails.
    async fn find_by_id(&self, user_id: UserId) -> UserGatewayResult<Option<User>>;

    /// Returns all known users.
    ///
    /// # Errors
    ///
    /// Returns [`UserGatewayError`] when the lookup fails.
    async fn find_all(&self) -> UserGatewayResult<Vec<User>>;
}

/// Errors returned by user gateway implementations.
#[derive(Debug, Clone, Error)]
pub enum UserGatewayError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl UserGatewayError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
