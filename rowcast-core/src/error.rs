//! Error types for the carousel core.
//!
//! None of these reach the user directly: every image failure is resolved
//! into a placeholder tile and logged.

use thiserror::Error;

/// Errors that can occur while loading or preparing poster imagery.
#[derive(Debug, Error)]
pub enum CarouselError {
    /// Transport failure before a response arrived.
    #[error("Network error: {0}")]
    Fetch(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {url}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Success status with no bytes.
    #[error("Empty response body: {0}")]
    EmptyBody(String),

    /// Bytes that are not a supported image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request outlived its timeout.
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The request was superseded or the view tore down.
    #[error("Cancelled")]
    Cancelled,

    /// A source string that is neither a path nor an http(s) URL.
    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),

    /// A remote source that does not parse as a URL.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        /// The raw source.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Texture upload or node creation failed.
    #[error("Rendering surface error: {0}")]
    Surface(String),

    /// Reading a local image failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for CarouselError {
    fn from(err: image::ImageError) -> Self {
        CarouselError::Decode(err.to_string())
    }
}

/// Result type for carousel operations
pub type Result<T> = std::result::Result<T, CarouselError>;
