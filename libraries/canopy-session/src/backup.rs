//! Backup sibling handling for the committed playlist

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix appended to the canonical file name
pub const BACKUP_SUFFIX: &str = ".backup";

/// `playlist.txt` -> `playlist.txt.backup`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(OsString::new);
    name.push(BACKUP_SUFFIX);
    path.with_file_name(name)
}

/// Move the canonical file aside
///
/// Best-effort: returns whether a backup now holds the previous content.
/// A missing canonical file is not an error, there is just nothing to back
/// up.
pub(crate) fn make_backup(path: &Path, backup: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    if let Err(e) = remove_if_exists(backup) {
        warn!("Failed to remove stale backup {}: {}", backup.display(), e);
        return false;
    }

    match fs::rename(path, backup) {
        Ok(()) => {
            debug!(from = %path.display(), to = %backup.display(), "Backed up playlist");
            true
        }
        Err(e) => {
            warn!("Failed to back up {}: {}", path.display(), e);
            false
        }
    }
}

/// Put the backup content back at the canonical path
///
/// The backup itself is kept so it can still be restored later.
pub(crate) fn restore_backup(backup: &Path, path: &Path) -> io::Result<()> {
    remove_if_exists(path)?;
    fs::copy(backup, path)?;
    debug!(from = %backup.display(), to = %path.display(), "Restored playlist from backup");
    Ok(())
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
