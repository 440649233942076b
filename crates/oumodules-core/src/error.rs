//! Error types for the OU modules core.

use thiserror::Error;

/// Core errors that can occur while authenticating, parsing or loading data.
///
/// Lookup misses and unrecognized interaction types are not errors: they are
/// ordinary branches of the reply state machine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("catalog error: {0}")]
    Catalog(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::MalformedRequest`] naming the offending field.
    pub fn missing(field: &str) -> Self {
        CoreError::MalformedRequest(format!("missing or invalid field `{field}`"))
    }
}
