//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// ownership, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, password too short).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found, or is not owned by the caller.
    ///
    /// Ownership mismatch is deliberately indistinguishable from absence so
    /// record existence cannot be probed across users.
    #[error("not found")]
    NotFound,

    /// A uniqueness conflict occurred (e.g. email already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The caller could not be authenticated.
    ///
    /// All authentication failure causes (missing/malformed/expired token,
    /// wrong token type, unresolvable subject) collapse into this variant.
    #[error("unauthenticated")]
    Unauthenticated,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
