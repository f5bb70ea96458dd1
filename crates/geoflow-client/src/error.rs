//! Error types for the platform client.

use geoflow_core::CoreError;
use thiserror::Error;

/// Errors that can occur when talking to the platform.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Platform returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Token provider could not supply a credential.
    #[error("auth error: {0}")]
    Auth(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Domain validation error from the task/workflow model.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Poll policy exhausted before the operation reached a terminal state.
    #[error("poll policy exhausted after {attempts} attempts")]
    PollTimeout { attempts: u32 },
}
