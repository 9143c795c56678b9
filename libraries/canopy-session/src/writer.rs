//! Persistence seam for committed trees

use canopy_core::{Result, Tree};
use std::path::Path;

/// Writes a tree to its canonical location
///
/// Implementations must not leave a half-written file at `path` when they
/// succeed; on failure the session restores the backup itself.
pub trait TreeWriter {
    /// Persist `tree` to `path`
    fn write_tree(&self, tree: &Tree, path: &Path) -> Result<()>;
}

/// Default writer: temp file plus atomic rename
#[derive(Debug, Default, Clone, Copy)]
pub struct AtomicTreeWriter;

impl TreeWriter for AtomicTreeWriter {
    fn write_tree(&self, tree: &Tree, path: &Path) -> Result<()> {
        tree.save(path)
    }
}
