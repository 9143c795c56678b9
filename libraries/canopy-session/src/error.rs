//! Edit session errors

use canopy_core::CanopyError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `SessionError`
pub type Result<T> = std::result::Result<T, SessionError>;

/// Edit session error types
#[derive(Error, Debug)]
pub enum SessionError {
    /// Operation needs a working copy but none is open
    #[error("No edit session is open")]
    NotEditing,

    /// A second working copy was requested
    #[error("An edit session is already open")]
    AlreadyEditing,

    /// Playlist file could not be loaded
    #[error("Failed to load playlist {}: {source}", path.display())]
    Load {
        /// File that failed to load
        path: PathBuf,
        /// Underlying error
        source: CanopyError,
    },

    /// Working copy could not be saved; the session stays open for a retry
    #[error("Failed to save playlist: {source}")]
    Persist {
        /// Underlying error
        source: CanopyError,
        /// Whether the previous file was put back from the backup
        restored: bool,
    },

    /// Restore requested but no backup exists
    #[error("No backup playlist at {}", .0.display())]
    NoBackup(PathBuf),

    /// Tree operation failed
    #[error(transparent)]
    Tree(#[from] CanopyError),
}
