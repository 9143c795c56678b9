//! Transactional playlist editing
//!
//! The committed tree is authoritative while viewing. Entering edit mode
//! clones it into a working copy; every mutation goes to that copy. A
//! commit moves the previous file aside as a backup, saves the copy and
//! swaps it in. If saving fails the backup is put back, so the canonical
//! file never mixes old and new content.
//!
//! ```text
//!            enter()
//!  Viewing ───────────▶ Editing ──┐ insert / toggle / remove / clean up
//!     ▲                   │  ▲    │
//!     │  commit() ok      │  └────┘
//!     │  cancel()         │
//!     └───────────────────┘  commit() failed: stays in Editing
//! ```

use crate::backup::{backup_path, make_backup, restore_backup};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::writer::{AtomicTreeWriter, TreeWriter};
use canopy_core::tree::join_path;
use canopy_core::{CanopyError, FileScanner, NodeId, Tree};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// Whether a working copy is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No working copy; the committed tree is authoritative
    Viewing,
    /// A working copy exists and may diverge from the committed tree
    Editing,
}

/// Result of a successful [`EditSession::commit`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Working copy matched the committed tree; nothing touched the disk
    Unchanged,
    /// Working copy was saved and is now the committed tree
    Saved {
        /// Whether the previous file was kept as a backup
        backed_up: bool,
    },
}

/// Owner of the committed playlist and its single working copy
#[derive(Debug)]
pub struct EditSession<W = AtomicTreeWriter> {
    committed: Tree,
    working: Option<Tree>,
    path: PathBuf,
    config: SessionConfig,
    writer: W,
}

impl EditSession<AtomicTreeWriter> {
    /// Wrap an already loaded tree persisted at `path`
    pub fn new(tree: Tree, path: impl Into<PathBuf>, config: SessionConfig) -> Self {
        Self::with_writer(tree, path, config, AtomicTreeWriter)
    }

    /// Load the committed tree from `path`
    ///
    /// A missing file gives an empty playlist; a corrupt one is an error.
    pub fn open(path: impl Into<PathBuf>, config: SessionConfig) -> Result<Self> {
        let path = path.into();
        let tree = load_or_empty(&path)?;
        Ok(Self::new(tree, path, config))
    }

    /// Like [`EditSession::open`], but a corrupt file resets to an empty
    /// playlist instead of failing
    pub fn open_or_reset(path: impl Into<PathBuf>, config: SessionConfig) -> Self {
        let path = path.into();
        let tree = load_or_empty(&path).unwrap_or_else(|e| {
            warn!("Starting with an empty playlist: {}", e);
            Tree::new()
        });
        Self::new(tree, path, config)
    }
}

impl<W: TreeWriter> EditSession<W> {
    /// Create a session that persists through a custom writer
    pub fn with_writer(
        tree: Tree,
        path: impl Into<PathBuf>,
        config: SessionConfig,
        writer: W,
    ) -> Self {
        Self {
            committed: tree,
            working: None,
            path: path.into(),
            config,
            writer,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        if self.working.is_some() {
            SessionState::Editing
        } else {
            SessionState::Viewing
        }
    }

    /// Whether a working copy is open
    pub fn is_editing(&self) -> bool {
        self.working.is_some()
    }

    /// The committed tree
    pub fn tree(&self) -> &Tree {
        &self.committed
    }

    /// Canonical playlist file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Backup sibling of the canonical file
    pub fn backup_path(&self) -> PathBuf {
        backup_path(&self.path)
    }

    /// Session options
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The working copy, if editing
    pub fn working_copy(&self) -> Option<&Tree> {
        self.working.as_ref()
    }

    /// Mutable access to the working copy
    pub fn working_copy_mut(&mut self) -> Result<&mut Tree> {
        self.working.as_mut().ok_or(SessionError::NotEditing)
    }

    /// Clone the committed tree into a working copy
    pub fn enter(&mut self) -> Result<&mut Tree> {
        if self.working.is_some() {
            return Err(SessionError::AlreadyEditing);
        }
        debug!(items = self.committed.item_count(), "Entering edit mode");
        Ok(self.working.insert(self.committed.clone()))
    }

    /// Insert an item path into the working copy
    pub fn insert_item(&mut self, path: &str) -> Result<NodeId> {
        Ok(self.working_copy_mut()?.insert_item(path)?)
    }

    /// Add files and directories to the working copy
    ///
    /// Returns how many new items were added.
    pub fn add_paths(&mut self, paths: &[PathBuf], scanner: &FileScanner) -> Result<usize> {
        let working = self.working_copy_mut()?;
        Ok(scanner.add_to_tree(working, paths))
    }

    /// Toggle a node of the working copy
    pub fn set_playable(&mut self, id: NodeId, playable: bool) -> Result<()> {
        self.working_copy_mut()?.set_playable(id, playable);
        Ok(())
    }

    /// Toggle the node a UI element was built from
    ///
    /// # Panics
    ///
    /// Panics if `segments` does not exist in the working copy. That means
    /// the UI and the tree are out of sync, which is a bug in the caller.
    pub fn set_playable_at<S: AsRef<str>>(&mut self, segments: &[S], playable: bool) -> Result<()> {
        let working = self.working_copy_mut()?;
        let Some(id) = working.descendant(segments) else {
            let path = join_path(segments.iter().map(AsRef::as_ref));
            panic!("node {path:?} is missing from the working copy");
        };
        working.set_playable(id, playable);
        Ok(())
    }

    /// Remove a subtree from the working copy
    pub fn remove(&mut self, id: NodeId) -> Result<()> {
        self.working_copy_mut()?.remove(id);
        Ok(())
    }

    /// Empty the working copy
    pub fn clear(&mut self) -> Result<()> {
        self.working_copy_mut()?.clear();
        Ok(())
    }

    /// Remove dead branches from the working copy
    pub fn clean_up(&mut self) -> Result<usize> {
        Ok(self.working_copy_mut()?.clean_up())
    }

    /// Whether the working copy equals the committed tree
    ///
    /// Always true while viewing.
    pub fn no_changes(&self) -> bool {
        self.working
            .as_ref()
            .map_or(true, |working| *working == self.committed)
    }

    /// Save the working copy and make it the committed tree
    ///
    /// An unchanged working copy is dropped without touching the disk. On a
    /// save failure the previous file is restored from the backup when one
    /// was made, and the session stays in edit mode so the caller can retry
    /// or cancel.
    pub fn commit(&mut self) -> Result<CommitOutcome> {
        let backup = self.backup_path();
        let Some(working) = self.working.as_mut() else {
            return Err(SessionError::NotEditing);
        };

        if self.config.auto_clean_up {
            let removed = working.clean_up();
            if removed > 0 {
                debug!(removed, "Cleaned up working copy before commit");
            }
        }

        if *working == self.committed {
            self.working = None;
            debug!("Working copy unchanged, leaving edit mode");
            return Ok(CommitOutcome::Unchanged);
        }

        let backed_up = make_backup(&self.path, &backup);

        if let Err(source) = self.writer.write_tree(working, &self.path) {
            let restored = backed_up && restore_or_log(&backup, &self.path);
            warn!(
                path = %self.path.display(),
                restored,
                "Failed to save playlist: {}", source
            );
            return Err(SessionError::Persist { source, restored });
        }

        if let Some(working) = self.working.take() {
            self.committed = working;
        }
        info!(
            path = %self.path.display(),
            items = self.committed.item_count(),
            backed_up,
            "Committed playlist"
        );
        Ok(CommitOutcome::Saved { backed_up })
    }

    /// Drop the working copy
    ///
    /// Returns whether a working copy was open.
    pub fn cancel(&mut self) -> bool {
        let was_editing = self.working.take().is_some();
        if was_editing {
            debug!("Discarded working copy");
        }
        was_editing
    }

    /// Replace the working copy with the tree saved in the backup file
    pub fn restore_previous(&mut self) -> Result<()> {
        if self.working.is_none() {
            return Err(SessionError::NotEditing);
        }

        let backup = self.backup_path();
        let tree = match Tree::load(&backup) {
            Ok(tree) => tree,
            Err(CanopyError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                return Err(SessionError::NoBackup(backup));
            }
            Err(source) => return Err(SessionError::Load { path: backup, source }),
        };

        info!(
            path = %backup.display(),
            items = tree.item_count(),
            "Restored previous playlist into working copy"
        );
        self.working = Some(tree);
        Ok(())
    }
}

fn load_or_empty(path: &Path) -> Result<Tree> {
    match Tree::load(path) {
        Ok(tree) => Ok(tree),
        Err(CanopyError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No playlist file yet");
            Ok(Tree::new())
        }
        Err(source) => Err(SessionError::Load {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn restore_or_log(backup: &Path, path: &Path) -> bool {
    match restore_backup(backup, path) {
        Ok(()) => true,
        Err(e) => {
            error!(
                "Failed to restore {} from {}: {}",
                path.display(),
                backup.display(),
                e
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(paths: &[&str]) -> EditSession {
        let mut tree = Tree::new();
        for path in paths {
            tree.insert_item(path).unwrap();
        }
        EditSession::new(tree, "unused/playlist.txt", SessionConfig::default())
    }

    #[test]
    fn starts_viewing() {
        let session = session_with(&["a.mp3"]);
        assert_eq!(session.state(), SessionState::Viewing);
        assert!(session.working_copy().is_none());
        assert!(session.no_changes());
    }

    #[test]
    fn enter_twice_fails() {
        let mut session = session_with(&[]);
        session.enter().unwrap();
        assert!(matches!(session.enter(), Err(SessionError::AlreadyEditing)));
    }

    #[test]
    fn mutations_need_edit_mode() {
        let mut session = session_with(&["a.mp3"]);
        assert!(matches!(
            session.insert_item("b.mp3"),
            Err(SessionError::NotEditing)
        ));
        assert!(matches!(session.clear(), Err(SessionError::NotEditing)));
        assert!(matches!(session.commit(), Err(SessionError::NotEditing)));
        assert!(matches!(
            session.restore_previous(),
            Err(SessionError::NotEditing)
        ));
    }

    #[test]
    fn mutations_touch_only_working_copy() {
        let mut session = session_with(&["dir/a.mp3"]);
        session.enter().unwrap();
        session.insert_item("dir/b.mp3").unwrap();

        assert_eq!(session.tree().item_count(), 1);
        assert_eq!(session.working_copy().unwrap().item_count(), 2);
        assert!(!session.no_changes());
    }

    #[test]
    fn toggling_back_is_no_change() {
        let mut session = session_with(&["dir/a.mp3"]);
        session.enter().unwrap();
        session.set_playable_at(&["dir", "a.mp3"], false).unwrap();
        assert!(!session.no_changes());
        session.set_playable_at(&["dir", "a.mp3"], true).unwrap();
        assert!(session.no_changes());
    }

    #[test]
    #[should_panic(expected = "missing from the working copy")]
    fn toggling_unknown_node_panics() {
        let mut session = session_with(&["dir/a.mp3"]);
        session.enter().unwrap();
        let _ = session.set_playable_at(&["dir", "zzz.mp3"], false);
    }

    #[test]
    fn cancel_discards_working_copy() {
        let mut session = session_with(&["a.mp3"]);
        session.enter().unwrap();
        session.clear().unwrap();
        assert!(session.cancel());
        assert_eq!(session.state(), SessionState::Viewing);
        assert_eq!(session.tree().item_count(), 1);
        assert!(!session.cancel());
    }

    #[test]
    fn commit_unchanged_leaves_edit_mode() {
        let mut session = session_with(&["a.mp3"]);
        session.enter().unwrap();
        assert_eq!(session.commit().unwrap(), CommitOutcome::Unchanged);
        assert!(!session.is_editing());
    }

    #[test]
    fn auto_clean_up_can_make_commit_trivial() {
        let mut session = session_with(&["dir/a.mp3"]);
        session.enter().unwrap();
        let b = session.insert_item("other/b.mp3").unwrap();
        session.set_playable(b, false).unwrap();
        assert!(!session.no_changes());

        // Only a dead branch was added; clean-up removes it again
        assert_eq!(session.commit().unwrap(), CommitOutcome::Unchanged);
    }
}
