//! Error types for user domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user identifier is not a positive integer.
    #[error("invalid user id {0}, expected a positive integer")]
    InvalidUserId(i64),

    /// The user name is empty after trimming.
    #[error("user name must not be empty")]
    EmptyName,

    /// The email address does not look like `local@domain`.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Error returned while parsing user statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown user status: {0}")]
pub struct ParseUserStatusError(pub String);
