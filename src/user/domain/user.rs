//! User entity and account status.

use super::{EmailAddress, ParseUserStatusError, UserId, UserName};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account status of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// The user may own and mutate tasks.
    Active,
    /// The user account is disabled.
    Inactive,
    /// The user account is suspended pending review.
    Suspended,
}

impl UserStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }

    /// Returns whether this status permits task operations.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UserStatus {
    type Error = ParseUserStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(ParseUserStatusError(value.to_owned())),
        }
    }
}

/// User entity, consumed read-only by the task use cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    status: UserStatus,
}

impl User {
    /// Creates a user from validated parts.
    #[must_use]
    pub const fn new(id: UserId, name: UserName, email: EmailAddress, status: UserStatus) -> Self {
        Self {
            id,
            name,
            email,
            status,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the account status.
    #[must_use]
    pub const fn status(&self) -> UserStatus {
        self.status
    }

    /// Returns whether the user may own and mutate tasks.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::domain::UserDomainError;

    fn build_user(status: UserStatus) -> User {
        let id = UserId::new(7).expect("valid user id");
        let name = UserName::new("Lucía Ortega").expect("valid name");
        let email = EmailAddress::new("lucia.ortega@company.com").expect("valid email");
        User::new(id, name, email, status)
    }

    #[test]
    fn user_id_rejects_non_positive_values() {
        assert_eq!(UserId::new(0), Err(UserDomainError::InvalidUserId(0)));
        assert_eq!(UserId::new(-3), Err(UserDomainError::InvalidUserId(-3)));
    }

    #[test]
    fn user_name_is_trimmed_and_non_empty() {
        let name = UserName::new("  Ana  ").expect("valid name");
        assert_eq!(name.as_str(), "Ana");
        assert_eq!(UserName::new("   "), Err(UserDomainError::EmptyName));
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "two@@signs.com", "user@nodot", "a b@c.com"] {
            assert!(
                EmailAddress::new(bad).is_err(),
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn only_active_users_are_active() {
        assert!(build_user(UserStatus::Active).is_active());
        assert!(!build_user(UserStatus::Inactive).is_active());
        assert!(!build_user(UserStatus::Suspended).is_active());
    }
}
