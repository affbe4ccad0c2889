//! Input validation errors

use thiserror::Error;

/// Rejected input, carrying a message safe to show to API clients
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    /// Create a new validation error
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
