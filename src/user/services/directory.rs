//! Service layer for user directory queries.

use crate::user::domain::{User, UserId};
use crate::user::ports::{UserGateway, UserGatewayError};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Service-level errors for user directory operations.
#[derive(Debug, Error)]
pub enum UserDirectoryError {
    /// The requested user does not exist.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// Gateway operation failed.
    #[error(transparent)]
    Gateway(#[from] UserGatewayError),
}

/// Result type for user directory operations.
pub type UserDirectoryResult<T> = Result<T, UserDirectoryError>;

/// Read-only user directory queries.
#[derive(Debug, Clone)]
pub struct UserDirectoryService<U>
where
    U: UserGateway,
{
    users: Arc<U>,
}

impl<U> UserDirectoryService<U>
where
    U: UserGateway,
{
    /// Creates a new user directory service.
    #[must_use]
    pub const fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// Retrieves a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::NotFound`] when the user does not
    /// exist and [`UserDirectoryError::Gateway`] when the lookup fails.
    pub async fn get_user(&self, user_id: UserId) -> UserDirectoryResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserDirectoryError::NotFound(user_id))
    }

    /// Lists all known users.
    ///
    /// # Errors
    ///
    /// Returns [`UserDirectoryError::Gateway`] when the lookup fails.
    pub async fn list_users(&self) -> UserDirectoryResult<Vec<User>> {
        let users = self.users.find_all().await?;
        debug!(count = users.len(), "listed users");
        Ok(users)
    }
}
