//! Shared primitives for all Rust crates in Warden.

#![forbid(unsafe_code)]

/// Authentication primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{ActorIdentity, UserId};

/// Result type used across Warden crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string with surrounding whitespace removed.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Role deletion blocked because users still hold the role.
    #[error("conflict: role '{role_name}' is still assigned to {user_count} user(s)")]
    RoleInUse {
        /// Name of the role that was kept.
        role_name: String,
        /// Number of assignments referencing the role.
        user_count: u64,
    },

    /// The user already holds the role being assigned.
    #[error("conflict: user '{user_id}' already has role '{role_name}'")]
    AlreadyAssigned {
        /// User targeted by the assignment.
        user_id: UserId,
        /// Role that is already assigned.
        role_name: String,
    },

    /// User is not authenticated or not allowed to access a resource.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// User is authenticated but blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Underlying data store or cache backend failure.
    #[error("store error: {0}")]
    Store(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns whether the error carries internal details that must not reach clients.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString, UserId};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_trims_surrounding_whitespace() {
        let value = NonEmptyString::new("  editor ");
        assert_eq!(value.map(String::from).unwrap_or_default(), "editor");
    }

    #[test]
    fn role_in_use_message_carries_user_count() {
        let error = AppError::RoleInUse {
            role_name: "editor".to_owned(),
            user_count: 3,
        };
        assert!(error.to_string().contains("3 user(s)"));
        assert!(!error.is_internal());
    }

    #[test]
    fn store_errors_are_internal() {
        assert!(AppError::Store("connection reset".to_owned()).is_internal());
        assert!(
            !AppError::AlreadyAssigned {
                user_id: UserId::new(),
                role_name: "editor".to_owned(),
            }
            .is_internal()
        );
    }
}
