//! Error types for apidoc-fetch

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for apidoc-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apidoc-fetch operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Writing the downloaded content failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The remote resource does not exist (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// The local file does not exist or is not a regular file
    #[error("Local file not found: {0}")]
    LocalFileNotFound(PathBuf),

    /// Remote scheme other than http(s)
    #[error("Unsupported URL scheme '{0}' (only http and https are supported)")]
    UnsupportedScheme(String),

    /// Invalid URL format
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new generic error
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Whether the failure means "the resource is absent" rather than "the transfer broke"
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::LocalFileNotFound(_))
    }
}
