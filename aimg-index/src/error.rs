//! Error types for aimg-index
//!
//! Each service defines its own error enum next to the code that raises
//! it. [`IndexError`] carries the ones the collection driver surfaces.

use std::path::PathBuf;
use thiserror::Error;

use crate::models::ImageId;
use crate::services::file_scanner::ScanError;

/// A gallery or embedding JSON file could not be used
#[derive(Debug, Error)]
pub enum SourceFileError {
    /// File does not exist
    #[error("Source file not found: {0}")]
    NotFound(PathBuf),

    /// File exists but is not valid for its format
    #[error("Malformed source file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// File could not be read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SourceFileError {
    /// Map a read failure, separating "not found" from other I/O errors
    pub fn from_read(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SourceFileError::NotFound(path.to_path_buf())
        } else {
            SourceFileError::Io {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }
}

/// Crate-level error type
#[derive(Debug, Error)]
pub enum IndexError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    SourceFile(#[from] SourceFileError),

    /// Well-formed identifier with no binding in the collection
    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(ImageId),

    /// Nothing in the collection matches a user-supplied image reference
    #[error("No image matches '{0}'")]
    UnknownImage(String),
}

/// Result type for aimg-index operations
pub type IndexResult<T> = Result<T, IndexError>;
