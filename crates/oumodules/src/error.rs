//! Error types for interaction handling.

use oumodules_core::CoreError;
use thiserror::Error;

/// Errors that end an invocation.
///
/// Authentication failures and unrecognized interactions are not here: they
/// become 401 and 404 responses.
#[derive(Debug, Error)]
pub enum InteractionError {
    /// Core error (malformed request, catalog loading).
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The handoff could not be published. Nothing can be done locally.
    #[error("publish error: {0}")]
    Publish(String),

    /// The worker could not resolve a code.
    #[error("resolver error: {0}")]
    Resolve(String),

    /// The claim registry could not be reached.
    #[error("claim error: {0}")]
    Claim(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for interaction handling.
pub type Result<T> = std::result::Result<T, InteractionError>;
