//! Errors raised by the domain primitives themselves.

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Failures of the pure domain layer.
///
/// Input problems the user can fix in a form are reported by the wizard;
/// stores, catalogs and exporters carry their own error types.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier could not be parsed or was empty.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Arithmetic or state that must never happen, such as a price overflow.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
