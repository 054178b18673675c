//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, unknown references). "No stock available" is not an error; it is
/// reported through the aggregate's message log.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// No batch with the given reference belongs to the aggregate.
    #[error("batch not found: {0}")]
    BatchNotFound(String),

    /// No product aggregate exists for the given SKU.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// A conflict occurred (e.g. duplicate identity).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn batch_not_found(reference: impl Into<String>) -> Self {
        Self::BatchNotFound(reference.into())
    }

    pub fn product_not_found(sku: impl Into<String>) -> Self {
        Self::ProductNotFound(sku.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
