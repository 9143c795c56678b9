//! Core error types for Canopy

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `CanopyError`
pub type Result<T> = std::result::Result<T, CanopyError>;

/// Core error type for Canopy
#[derive(Error, Debug)]
pub enum CanopyError {
    /// Item path cannot be represented in the tree
    #[error("Invalid item path {path:?}: {reason}")]
    InvalidPath {
        /// Path as given by the caller
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// Persisted playlist is malformed
    #[error("Malformed playlist at line {line}: {message}")]
    Parse {
        /// Line number (1-based)
        line: usize,
        /// What is wrong with the line
        message: String,
    },

    /// Path given to the scanner does not exist
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Path given to the scanner is not a directory
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CanopyError {
    /// Create an invalid path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error for a 1-based line number
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
