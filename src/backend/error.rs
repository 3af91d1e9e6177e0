//! Error types for backend calls.

use thiserror::Error;

/// Message shown when the backend gives nothing better.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

/// Backend client error.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport failure: connect, timeout, body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured base URL cannot carry path segments.
    #[error("Backend URL cannot be used as a base: {0}")]
    CannotBeABase(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Credentials missing, invalid or expired (HTTP 401).
    #[error("Unauthorized")]
    Unauthorized,

    /// The requested entity does not exist (HTTP 404).
    #[error("Not found")]
    NotFound,

    /// Any other non-success response.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message drawn from the error payload, or [`GENERIC_FAILURE`].
        message: String,
    },
}

impl BackendError {
    /// Whether the session behind this call must be discarded.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Text suitable for a toast notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_string(),
            Self::NotFound => "The requested record was not found.".to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
