//! Canopy Playback
//!
//! Playback-side logic over a Canopy playlist tree.
//!
//! This crate provides:
//! - Playback history (bounded, most recent first, with a movable cursor)
//! - Uniform random item selection over a [`canopy_core::Tree`]
//! - Recency-avoiding selection with a capped exclusion window
//!
//! # Example
//!
//! ```rust
//! use canopy_core::Tree;
//! use canopy_playback::{History, PlaybackConfig, RandomItemChooser};
//!
//! let config = PlaybackConfig::default();
//! let mut tree = Tree::new();
//! for name in ["a", "b", "c", "d", "e"] {
//!     tree.insert_item(&format!("/music/{name}.mp3")).unwrap();
//! }
//!
//! let mut history = History::new(config.history_size);
//! let mut chooser = RandomItemChooser::from_seed(7);
//!
//! let path = chooser
//!     .random_path_avoiding(&tree, &history, config.recent_skip_count)
//!     .expect("tree has items");
//! history.push(path.clone());
//! assert_eq!(history.current(), Some(path.as_str()));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chooser;
mod error;
mod history;
pub mod types;

// Public exports
pub use chooser::{recent_window, RandomItemChooser, RecentItems};
pub use error::{PlaybackError, Result};
pub use history::{History, MULTIPLE_ITEMS_INDEX};
pub use types::PlaybackConfig;
