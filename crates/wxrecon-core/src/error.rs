//! Error types for the wxrecon-core library.
//!
//! This module provides error handling using the `thiserror` crate, with
//! variants for the failure modes of a reconstruction run.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for wxrecon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all wxrecon operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Failed to read a file from the output tree
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        /// Path to the file that failed to read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to write output file
    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        /// Path to the file that failed to write
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to create output directory
    #[error("failed to create directory '{path}': {source}")]
    DirectoryCreate {
        /// Path to the directory that failed to create
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to walk the output tree
    #[error("failed to walk output tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Path traversal attempt detected (security error)
    #[error("path traversal detected: '{path}' would escape output directory")]
    PathTraversal {
        /// The suspicious path
        path: PathBuf,
    },

    /// Manifest or configuration text is not valid JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A manifest field has an unexpected shape
    #[error("malformed manifest field '{field}': {details}")]
    MalformedManifest {
        /// Name of the offending field
        field: String,
        /// Detailed description of the issue
        details: String,
    },

    /// The manifest source text was never supplied
    #[error("manifest source not found")]
    MissingManifestSource,

    /// The service bundle source was never supplied
    #[error("service source not found")]
    MissingServiceSource,

    /// The consumer of the service match stream went away
    #[error("service match channel closed")]
    ChannelClosed,

    /// The parser instance has already been run
    #[error("parser already ran; one run per instance")]
    AlreadyRun,

    /// Fatal failure of a reconstruction run
    #[error("parse failed: {source}")]
    ParseFailed {
        /// The error that aborted the run
        #[source]
        source: Box<Error>,
    },

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates a new file read error
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a new file write error
    pub fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }

    /// Creates a new directory creation error
    pub fn directory_create(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreate {
            path: path.into(),
            source,
        }
    }

    /// Creates a new path traversal error
    pub fn path_traversal(path: impl Into<PathBuf>) -> Self {
        Self::PathTraversal { path: path.into() }
    }

    /// Creates a new malformed manifest error
    pub fn malformed(field: impl Into<String>, details: impl Into<String>) -> Self {
        Self::MalformedManifest {
            field: field.into(),
            details: details.into(),
        }
    }

    /// Creates a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wraps an error as a fatal run failure.
    ///
    /// Already wrapped errors are returned unchanged.
    pub fn parse_failed(self) -> Self {
        match self {
            Self::ParseFailed { .. } => self,
            other => Self::ParseFailed {
                source: Box::new(other),
            },
        }
    }

    /// Returns true if this error aborted a reconstruction run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ParseFailed { .. })
    }

    /// Returns the underlying cause of a fatal run failure
    pub fn cause(&self) -> &Error {
        match self {
            Self::ParseFailed { source } => source,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::path_traversal("../etc/passwd");
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
    }

    #[test]
    fn test_parse_failed_prefix() {
        let err = Error::MissingServiceSource.parse_failed();
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "parse failed: service source not found");
        assert!(matches!(err.cause(), Error::MissingServiceSource));
    }

    #[test]
    fn test_parse_failed_is_not_nested() {
        let err = Error::internal("boom").parse_failed().parse_failed();
        assert!(matches!(err.cause(), Error::Internal(_)));
    }
}
