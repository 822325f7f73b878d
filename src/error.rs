//! Error types for image editing.

use std::path::PathBuf;

/// Errors that can occur while submitting an edit or materializing results.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// API key missing or empty.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Endpoint, API version, or deployment name missing or empty.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Input image could not be opened or read.
    #[error("cannot open input image '{}': {source}", .path.display())]
    FileAccess {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        message: String,
    },

    /// Response JSON did not match the expected shape, or an image payload
    /// could not be decoded. Carries the raw response body for diagnosis.
    #[error("malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with the response.
        message: String,
        /// The raw response body.
        raw: String,
    },

    /// I/O error (e.g., writing an output file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The user aborted an interactive run.
    #[error("aborted by user")]
    Aborted,
}

impl EditError {
    /// Returns true if this error should abort the invocation with a
    /// non-zero exit code instead of printing a diagnostic and ending
    /// normally. Only an unreadable input image qualifies; it is detected
    /// before any network call is made.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FileAccess { .. })
    }

    /// Returns the raw response body attached to this error, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias for edit operations.
pub type Result<T> = std::result::Result<T, EditError>;
