//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// costing, lifecycle). Infrastructure concerns belong elsewhere. None of
/// these are transient: nothing here should ever be retried or silently
/// replaced with a default value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A quantity was malformed (non-positive where positive is required,
    /// negative stock, zero yield, ...).
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A cost or price was malformed (negative unit cost, negative labor).
    #[error("invalid cost: {0}")]
    InvalidCost(String),

    /// Some other input failed validation (unit mismatch, empty name,
    /// missing re-price cost, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A lifecycle transition is not allowed from the current state.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// A requested aggregate was not found (domain-level).
    #[error("not found")]
    NotFound,

    /// A conflict occurred (e.g. stale version / duplicate creation).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn invalid_cost(msg: impl Into<String>) -> Self {
        Self::InvalidCost(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_transition(msg: impl Into<String>) -> Self {
        Self::InvalidTransition(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
