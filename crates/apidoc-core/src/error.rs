//! Error types for apidoc core.

use crate::types::Platform;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for apidoc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Input checks performed before any I/O.
    Precondition,
    /// Fetching the archive or metadata descriptor.
    Acquisition,
    /// Extracting the archive.
    Unpack,
    /// Building the isolated execution context.
    Sandbox,
    /// Running the per-platform extraction routine.
    Analysis,
    /// Checking the assembled record against the schema.
    Validation,
    /// Writing the validated record.
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Precondition => "precondition",
            Stage::Acquisition => "acquisition",
            Stage::Unpack => "unpack",
            Stage::Sandbox => "sandbox",
            Stage::Analysis => "analysis",
            Stage::Validation => "validation",
            Stage::Persistence => "persistence",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while analyzing an artifact.
#[derive(Debug, Error)]
pub enum Error {
    /// A required input is missing or malformed.
    #[error("Missing or invalid input `{field}`: {reason}")]
    Precondition {
        /// Name of the offending input.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// The archive or metadata descriptor could not be fetched.
    #[error("Failed to acquire {location}: {message}")]
    Acquisition {
        /// Remote URI or local path that was requested.
        location: String,
        /// Description of the failure.
        message: String,
    },

    /// The archive could not be extracted.
    #[error("Failed to unpack {archive}: {message}")]
    Unpack {
        /// Local archive file.
        archive: PathBuf,
        /// Description of the failure.
        message: String,
    },

    /// The sandbox could not be constructed.
    #[error("Sandbox construction failed: {message}")]
    Sandbox {
        /// Description of the failure.
        message: String,
    },

    /// The extraction routine failed for a platform.
    #[error("Analysis failed for platform {platform}: {message}")]
    Analysis {
        /// Platform being analyzed.
        platform: Platform,
        /// Description of the failure, usually including stderr output.
        message: String,
    },

    /// The assembled record does not conform to the schema.
    #[error("Analysis result failed schema validation: {}", .errors.join("; "))]
    Validation {
        /// One message per violation.
        errors: Vec<String>,
    },

    /// The validated record could not be written.
    #[error("Failed to persist {path}: {source}")]
    Persistence {
        /// Target file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid path
    #[error("Invalid path {path:?}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// Path traversal attempt detected
    #[error("Path traversal: {attempted_path:?} outside {root:?}")]
    PathTraversal {
        attempted_path: PathBuf,
        root: PathBuf,
    },
}

impl Error {
    /// Shorthand for a precondition failure.
    pub fn precondition(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Precondition {
            field,
            reason: reason.into(),
        }
    }

    /// Shorthand for an acquisition failure.
    pub fn acquisition(location: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Acquisition {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Shorthand for a sandbox failure.
    pub fn sandbox(message: impl Into<String>) -> Self {
        Self::Sandbox {
            message: message.into(),
        }
    }

    /// Shorthand for an analysis failure.
    pub fn analysis(platform: Platform, message: impl Into<String>) -> Self {
        Self::Analysis {
            platform,
            message: message.into(),
        }
    }

    /// Returns the pipeline stage this error belongs to.
    ///
    /// Untyped I/O and JSON errors are attributed to persistence, the only
    /// stage that produces them without wrapping.
    pub fn stage(&self) -> Stage {
        match self {
            Error::Precondition { .. } => Stage::Precondition,
            Error::Acquisition { .. } => Stage::Acquisition,
            Error::Unpack { .. } | Error::InvalidPath { .. } | Error::PathTraversal { .. } => {
                Stage::Unpack
            }
            Error::Sandbox { .. } => Stage::Sandbox,
            Error::Analysis { .. } => Stage::Analysis,
            Error::Validation { .. } => Stage::Validation,
            Error::Persistence { .. } | Error::Json(_) | Error::Io(_) => Stage::Persistence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        assert_eq!(
            Error::precondition("version", "empty").stage(),
            Stage::Precondition
        );
        assert_eq!(
            Error::acquisition("/missing.jar", "not found").stage(),
            Stage::Acquisition
        );
        assert_eq!(Error::sandbox("unresolvable").stage(), Stage::Sandbox);
        assert_eq!(
            Error::analysis(Platform::Cljs, "boom").stage(),
            Stage::Analysis
        );
        assert_eq!(
            Error::Validation { errors: vec![] }.stage(),
            Stage::Validation
        );
    }

    #[test]
    fn test_validation_message_joins_errors() {
        let err = Error::Validation {
            errors: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Analysis result failed schema validation: a; b"
        );
    }
}
