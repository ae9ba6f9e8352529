//! Domain error types

use thiserror::Error;

/// Validation errors raised by domain entities
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid role: {0}")]
    InvalidRole(String),
}
