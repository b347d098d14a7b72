//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, guarded transitions). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, missing country list).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A unique code collided on create.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// A stale write was rejected (optimistic concurrency).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Delete/deactivate blocked because another record still references this one.
    #[error("in use: {0}")]
    InUse(String),

    /// The requested lifecycle transition is not in the allowed table.
    #[error("invalid transition from '{from}' to '{requested}'")]
    InvalidTransition { from: String, requested: String },

    /// A shipment past pickup cannot be cancelled.
    #[error("shipment in state '{0}' cannot be cancelled")]
    CannotCancel(String),

    /// A refund was already processed for this return.
    #[error("return already refunded")]
    AlreadyRefunded,

    /// Authorization failure at the domain boundary.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn in_use(msg: impl Into<String>) -> Self {
        Self::InUse(msg.into())
    }

    pub fn invalid_transition(from: impl Into<String>, requested: impl Into<String>) -> Self {
        Self::InvalidTransition {
            from: from.into(),
            requested: requested.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
