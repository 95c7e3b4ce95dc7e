//! The module contains the errors the engine can return.
//!
//! Every operation returns one of these variants; nothing is retried inside
//! the engine. The interesting ones for callers are:
//!
//! - [`InsufficientStock`] when a ledger balance cannot cover a decrease.
//! - [`InvalidTransition`] when a production order rejects a status change.
//! - [`ExtraNotAllowed`] / [`ExtraLimitExceeded`] for off-recipe usage.
//! - [`Integrity`] when a read finds state that the ledger discipline forbids.
//!
//!  [`InsufficientStock`]: EngineError::InsufficientStock
//!  [`InvalidTransition`]: EngineError::InvalidTransition
//!  [`ExtraNotAllowed`]: EngineError::ExtraNotAllowed
//!  [`ExtraLimitExceeded`]: EngineError::ExtraLimitExceeded
//!  [`Integrity`]: EngineError::Integrity
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Extra ingredient not allowed: {0}")]
    ExtraNotAllowed(String),
    #[error("Extra ingredient limit exceeded: {0}")]
    ExtraLimitExceeded(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Integrity violation: {0}")]
    Integrity(String),
    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidTransition(a), Self::InvalidTransition(b)) => a == b,
            (Self::InsufficientStock(a), Self::InsufficientStock(b)) => a == b,
            (Self::ExtraNotAllowed(a), Self::ExtraNotAllowed(b)) => a == b,
            (Self::ExtraLimitExceeded(a), Self::ExtraLimitExceeded(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Integrity(a), Self::Integrity(b)) => a == b,
            (Self::InvalidUnit(a), Self::InvalidUnit(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
