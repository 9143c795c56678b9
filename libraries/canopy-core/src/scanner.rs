//! Adding items from the filesystem
//!
//! Directories are expanded into the media files below them; plain files
//! are inserted as they are.

use crate::error::{CanopyError, Result};
use crate::tree::Tree;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Default media file extensions
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "oga", "opus", "wav", "aac", "m4a", "wma", "mka", "mkv", "mp4", "m4v",
    "avi", "webm", "mov", "wmv", "mpg", "mpeg",
];

/// Scanner for media files in directories
#[derive(Debug, Clone)]
pub struct FileScanner {
    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse (`None` for unlimited)
    max_depth: Option<usize>,

    /// Accepted extensions, lowercase
    extensions: Vec<String>,
}

impl Default for FileScanner {
    fn default() -> Self {
        Self {
            follow_links: false,
            max_depth: None,
            extensions: SUPPORTED_EXTENSIONS.iter().map(|ext| (*ext).to_owned()).collect(),
        }
    }
}

impl FileScanner {
    /// Create a new file scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Replace the accepted extensions
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .collect();
        self
    }

    /// Whether `path` has an accepted extension
    pub fn is_media_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Scan a directory for media files, sorted by path
    pub fn scan_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(CanopyError::NotFound(path.to_path_buf()));
        }

        if !path.is_dir() {
            return Err(CanopyError::NotADirectory(path.to_path_buf()));
        }

        let mut walker = WalkDir::new(path)
            .follow_links(self.follow_links)
            .sort_by_file_name();

        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                    continue;
                }
            };

            if entry.file_type().is_file() && self.is_media_file(entry.path()) {
                files.push(entry.into_path());
            }
        }

        debug!(root = %path.display(), files = files.len(), "Scanned directory");
        Ok(files)
    }

    /// Insert files and the media files below directories into `tree`
    ///
    /// Inputs that cannot be read or represented are logged and skipped.
    /// Returns how many new items the tree gained.
    pub fn add_to_tree(&self, tree: &mut Tree, paths: &[PathBuf]) -> usize {
        let before = tree.item_count();

        for path in paths {
            if path.is_dir() {
                match self.scan_directory(path) {
                    Ok(files) => {
                        for file in &files {
                            insert_path(tree, file);
                        }
                    }
                    Err(e) => warn!("Failed to scan {}: {}", path.display(), e),
                }
            } else {
                insert_path(tree, path);
            }
        }

        tree.item_count() - before
    }
}

/// Insert one filesystem path as an item
fn insert_path(tree: &mut Tree, path: &Path) {
    let Some(text) = path.to_str() else {
        warn!("Skipping non UTF-8 path {}", path.display());
        return;
    };

    let text = if std::path::MAIN_SEPARATOR == '\\' {
        text.replace('\\', "/")
    } else {
        text.to_owned()
    };

    if let Err(e) = tree.insert_item(&text) {
        warn!("Skipping {}: {}", path.display(), e);
    }
}
