//! Error types for caricature generation.

use std::path::PathBuf;

/// Longest payload excerpt kept in error messages.
const MAX_PAYLOAD_DISPLAY: usize = 512;

/// Broad category of a [`CaricatureError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input image could not be read or decoded.
    Decode,
    /// The API credential or client setup is missing or invalid.
    Configuration,
    /// Transport failure or non-success HTTP status.
    Request,
    /// A success-status response that carried no usable image.
    ResponseFormat,
    /// Caller-supplied parameters were rejected before any work was done.
    InvalidInput,
    /// Local encoding or file system failure.
    Io,
}

/// Errors that can occur while producing a caricature.
#[derive(Debug, thiserror::Error)]
pub enum CaricatureError {
    /// Input file missing, corrupt, or in an unsupported format.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// API key missing or client could not be configured.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Network or HTTP transport error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {}", truncate(message))]
    Api { status: u16, message: String },

    /// API returned success but the body held no decodable image.
    #[error("unexpected response format: {reason} (payload: {})", truncate(payload))]
    ResponseFormat { reason: String, payload: String },

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to encode the preprocessed image.
    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CaricatureError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Network(_) | Self::Api { .. } => ErrorKind::Request,
            Self::ResponseFormat { .. } => ErrorKind::ResponseFormat,
            Self::InvalidRequest(_) => ErrorKind::InvalidInput,
            Self::Encode(_) | Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Returns the HTTP status code for API errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub(crate) fn response_format(reason: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::ResponseFormat {
            reason: reason.into(),
            payload: payload.into(),
        }
    }
}

pub(crate) fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_PAYLOAD_DISPLAY {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_PAYLOAD_DISPLAY).collect();
    format!("{cut}... ({} bytes total)", text.len())
}

/// Result type alias for caricature operations.
pub type Result<T> = std::result::Result<T, CaricatureError>;
