//! Canopy Session
//!
//! Transactional editing of the committed Canopy playlist.
//!
//! This crate provides:
//! - [`EditSession`]: one optional working copy over a committed [`Tree`]
//! - Commit with backup: the previous file is kept as `<name>.backup` and
//!   put back when saving fails
//! - [`TreeWriter`]: the persistence seam, atomic by default
//!
//! # Example
//!
//! ```rust,no_run
//! use canopy_session::{CommitOutcome, EditSession, SessionConfig};
//!
//! let mut session = EditSession::open("playlist.txt", SessionConfig::default())?;
//!
//! session.enter()?;
//! session.insert_item("/music/new.mp3")?;
//!
//! match session.commit() {
//!     Ok(CommitOutcome::Saved { .. }) => println!("saved"),
//!     Ok(CommitOutcome::Unchanged) => println!("nothing to do"),
//!     Err(e) => {
//!         eprintln!("{e}");
//!         session.cancel();
//!     }
//! }
//! # Ok::<(), canopy_session::SessionError>(())
//! ```
//!
//! [`Tree`]: canopy_core::Tree

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod config;
mod error;
mod session;
mod writer;

// Public exports
pub use backup::{backup_path, BACKUP_SUFFIX};
pub use config::SessionConfig;
pub use error::{Result, SessionError};
pub use session::{CommitOutcome, EditSession, SessionState};
pub use writer::{AtomicTreeWriter, TreeWriter};
