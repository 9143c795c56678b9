//! Canopy Core
//!
//! The playlist tree behind Canopy: directories and files merged into one
//! forest where only some nodes are playable.
//!
//! This crate provides:
//! - **Tree model**: arena-backed [`Tree`] with lazily cached item counts
//!   and pre-order item numbering
//! - **Persistence**: line-oriented playlist format with atomic saves
//! - **Scanning**: [`FileScanner`] for adding directories of media files
//! - **Error Handling**: unified [`CanopyError`] and [`Result`] types
//!
//! # Example
//!
//! ```rust
//! use canopy_core::Tree;
//!
//! let mut tree = Tree::new();
//! tree.insert_item("/music/rock/a.mp3")?;
//! tree.insert_item("/music/jazz/b.flac")?;
//!
//! assert_eq!(tree.item_count(), 2);
//! assert_eq!(tree.item_path(1).as_deref(), Some("/music/jazz/b.flac"));
//!
//! let rock = tree.find("/music/rock").expect("directory node");
//! assert!(!tree.node(rock).is_playable());
//! # Ok::<(), canopy_core::CanopyError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod scanner;
pub mod tree;

// Re-export commonly used types
pub use error::{CanopyError, Result};
pub use scanner::FileScanner;
pub use tree::{Node, NodeId, Tree};
