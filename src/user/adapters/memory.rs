//! In-memory user gateway for development and tests.
//!
//! Seed data is an explicit constructor argument; nothing is loaded at
//! process startup and there is no process-wide user map. Callers that
//! want file-backed seed data pass a capability-scoped directory handle.

use crate::user::domain::{EmailAddress, User, UserDomainError, UserId, UserName, UserStatus};
use crate::user::ports::{UserGateway, UserGatewayResult};
use async_trait::async_trait;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors returned while loading user seed data.
#[derive(Debug, Error)]
pub enum UserSeedError {
    /// The seed file could not be read.
    #[error("failed to read user seed file: {0}")]
    Io(#[from] std::io::Error),

    /// The seed file is not valid JSON.
    #[error("failed to parse user seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A seed record failed domain validation.
    #[error(transparent)]
    Domain(#[from] UserDomainError),

    /// A seed record carries an unknown status label.
    #[error("unknown user status in seed record: {0}")]
    UnknownStatus(String),
}

/// Raw user record as stored in a JSON seed file.
#[derive(Debug, Clone, Deserialize)]
struct UserRecord {
    user_id: i64,
    name: String,
    email: String,
    status: String,
}

impl TryFrom<UserRecord> for User {
    type Error = UserSeedError;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let status = UserStatus::try_from(record.status.as_str())
            .map_err(|err| UserSeedError::UnknownStatus(err.0))?;
        Ok(Self::new(
            UserId::new(record.user_id)?,
            UserName::new(record.name)?,
            EmailAddress::new(record.email)?,
            status,
        ))
    }
}

/// In-memory user gateway seeded at construction.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserGateway {
    users: HashMap<UserId, User>,
}

impl InMemoryUserGateway {
    /// Creates a gateway over the given users.
    #[must_use]
    pub fn new(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().map(|user| (user.id(), user)).collect(),
        }
    }

    /// Parses users from a JSON array of seed records.
    ///
    /// # Errors
    ///
    /// Returns [`UserSeedError`] when the JSON is malformed or a record
    /// fails domain validation.
    pub fn from_json(json: &str) -> Result<Self, UserSeedError> {
        let records: Vec<UserRecord> = serde_json::from_str(json)?;
        let users = records
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(users))
    }

    /// Loads users from a JSON seed file inside the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`UserSeedError`] when the file cannot be read or parsed.
    pub fn load_from_dir(dir: &Dir, file_name: &str) -> Result<Self, UserSeedError> {
        let json = dir.read_to_string(file_name)?;
        Self::from_json(&json)
    }

    /// Returns the number of seeded users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Returns whether no users are seeded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserGateway for InMemoryUserGateway {
    async fn find_by_id(&self, user_id: UserId) -> UserGatewayResult<Option<User>> {
        Ok(self.users.get(&user_id).cloned())
    }

    async fn find_all(&self) -> UserGatewayResult<Vec<User>> {
        Ok(self.users.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"[
        {"user_id": 1, "name": "Juan Pérez", "email": "juan.perez@company.com", "status": "active"},
        {"user_id": 2, "name": "Ana Martínez", "email": "ana.martinez@company.com", "status": "inactive"}
    ]"#;

    #[test]
    fn from_json_builds_validated_users() {
        let gateway = InMemoryUserGateway::from_json(SEED).expect("seed should parse");
        assert_eq!(gateway.len(), 2);
    }

    #[test]
    fn from_json_rejects_unknown_status() {
        let bad = r#"[{"user_id": 1, "name": "X", "email": "x@y.com", "status": "banned"}]"#;
        let result = InMemoryUserGateway::from_json(bad);
        assert!(matches!(result, Err(UserSeedError::UnknownStatus(_))));
    }

    #[test]
    fn from_json_rejects_invalid_user_id() {
        let bad = r#"[{"user_id": 0, "name": "X", "email": "x@y.com", "status": "active"}]"#;
        let result = InMemoryUserGateway::from_json(bad);
        assert!(matches!(result, Err(UserSeedError::Domain(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn find_by_id_returns_seeded_user() {
        let gateway = InMemoryUserGateway::from_json(SEED).expect("seed should parse");
        let user_id = UserId::new(1).expect("valid user id");
        let user = gateway
            .find_by_id(user_id)
            .await
            .expect("lookup should succeed")
            .expect("user should exist");
        assert_eq!(user.name().as_str(), "Juan Pérez");
        assert!(user.is_active());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn find_by_id_returns_none_for_unknown_user() {
        let gateway = InMemoryUserGateway::from_json(SEED).expect("seed should parse");
        let user_id = UserId::new(99).expect("valid user id");
        let found = gateway
            .find_by_id(user_id)
            .await
            .expect("lookup should succeed");
        assert!(found.is_none());
    }
}
