//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a caller-input failure: nothing is retried and nothing is
/// committed before one of these is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The identifier (as given by the caller) does not name an account.
    #[error("account not found: {0}")]
    NotFound(String),

    /// The supplied PIN does not match the account's PIN.
    #[error("invalid pin")]
    InvalidPin,

    /// The amount is non-positive or exceeds what the source account holds.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}

impl DomainError {
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    pub fn invalid_amount(msg: impl Into<String>) -> Self {
        Self::InvalidAmount(msg.into())
    }

    /// Short, stable name of the error kind (for logs).
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::NotFound(_) => "not_found",
            DomainError::InvalidPin => "invalid_pin",
            DomainError::InvalidAmount(_) => "invalid_amount",
        }
    }
}
