//! Command implementations
//!
//! Each command loads what it needs from the configured paths, does its
//! work and writes human-readable output to `out`. Playlist mutations go
//! through [`EditSession`]; a failed commit cancels the working copy before
//! the error is returned.

use crate::config::CanopyConfig;
use anyhow::{bail, Context, Result};
use canopy_core::atomic::write_atomic;
use canopy_core::FileScanner;
use canopy_playback::{History, PlaybackError, RandomItemChooser};
use canopy_session::{CommitOutcome, EditSession};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Suffix of the file next to the history that stores its cursor
pub const CURSOR_SUFFIX: &str = ".cursor";

/// What to do with the playback history
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// Print entries, marking the current one
    Show,
    /// Move the cursor to the next older entry
    Previous,
    /// Move the cursor to the next newer entry
    Next,
    /// Drop the entries at these indices
    Remove(Vec<usize>),
    /// Drop all entries
    Clear,
}

/// Add files and directories to the playlist
///
/// Inputs are canonicalized, so every spelling of a file maps to the same
/// item and items stay playable from anywhere.
pub fn add<W: Write>(config: &CanopyConfig, paths: &[PathBuf], out: &mut W) -> Result<usize> {
    let mut resolved = Vec::with_capacity(paths.len());
    for path in paths {
        if !path.exists() {
            bail!("{} does not exist", path.display());
        }
        let canonical = fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        resolved.push(strip_verbatim(canonical));
    }

    let mut session = open_session(config)?;
    session.enter()?;
    let added = session.add_paths(&resolved, &FileScanner::new())?;
    commit(&mut session)?;

    writeln!(out, "Added {added} items")?;
    Ok(added)
}

/// Print every playable item in playlist order
pub fn list<W: Write>(config: &CanopyConfig, out: &mut W) -> Result<()> {
    let session = open_session(config)?;
    for item in session.tree().items() {
        writeln!(out, "{item}")?;
    }
    Ok(())
}

/// Print the number of playable items
pub fn count<W: Write>(config: &CanopyConfig, out: &mut W) -> Result<usize> {
    let session = open_session(config)?;
    let count = session.tree().item_count();
    writeln!(out, "{count}")?;
    Ok(count)
}

/// Remove a node and everything below it
pub fn remove<W: Write>(config: &CanopyConfig, path: &str, out: &mut W) -> Result<()> {
    let mut session = open_session(config)?;
    let Some(id) = session.tree().find(path) else {
        bail!("{path} is not in the playlist");
    };
    let removed = session.tree().subtree_item_count(id);

    session.enter()?;
    session.remove(id)?;
    commit(&mut session)?;

    writeln!(out, "Removed {removed} items")?;
    Ok(())
}

/// Flip whether a node is playable
///
/// Returns the new state. With clean-up on commit, turning off a leaf
/// drops it from the playlist.
pub fn toggle<W: Write>(config: &CanopyConfig, path: &str, out: &mut W) -> Result<bool> {
    let mut session = open_session(config)?;
    let Some(id) = session.tree().find(path) else {
        bail!("{path} is not in the playlist");
    };
    let playable = !session.tree().node(id).is_playable();

    session.enter()?;
    session.set_playable(id, playable)?;
    commit(&mut session)?;

    let state = if playable { "playable" } else { "not playable" };
    writeln!(out, "{path} is now {state}")?;
    Ok(playable)
}

/// Remove branches without playable items
pub fn clean<W: Write>(config: &CanopyConfig, out: &mut W) -> Result<usize> {
    let mut session = open_session(config)?;
    session.enter()?;
    let removed = session.clean_up()?;
    commit(&mut session)?;

    writeln!(out, "Removed {removed} nodes")?;
    Ok(removed)
}

/// Pick a random item and record it in the history
///
/// Returns `None` when the playlist has nothing to play.
pub fn random<W: Write>(
    config: &CanopyConfig,
    avoid_recent: bool,
    seed: Option<u64>,
    out: &mut W,
) -> Result<Option<String>> {
    let session = open_session(config)?;
    let tree = session.tree();
    let mut history = load_history(config);
    let mut chooser = seed.map_or_else(RandomItemChooser::new, RandomItemChooser::from_seed);

    let picked = if avoid_recent {
        chooser.random_path_avoiding(tree, &history, config.playback.recent_skip_count)
    } else {
        chooser.random_path(tree)
    };

    let Some(path) = picked else {
        writeln!(out, "Playlist has no playable items")?;
        return Ok(None);
    };

    history.push(path.clone());
    save_history(config, &history)?;

    writeln!(out, "{path}")?;
    Ok(Some(path))
}

/// Show or edit the playback history
pub fn history<W: Write>(config: &CanopyConfig, action: HistoryAction, out: &mut W) -> Result<()> {
    let mut history = load_history(config);

    match action {
        HistoryAction::Show => {
            if history.current_index().is_none() && !history.is_empty() {
                writeln!(out, "(current: multiple items)")?;
            }
            for (index, entry) in history.entries().enumerate() {
                let marker = if history.current_index() == Some(index) {
                    '*'
                } else {
                    ' '
                };
                writeln!(out, "{marker} {index:>3}  {entry}")?;
            }
            return Ok(());
        }
        HistoryAction::Previous => {
            let entry = history.previous().map(str::to_owned);
            if !report_move(entry, out)? {
                return Ok(());
            }
        }
        HistoryAction::Next => {
            let entry = history.next().map(str::to_owned);
            if !report_move(entry, out)? {
                return Ok(());
            }
        }
        HistoryAction::Remove(indices) => {
            if let Some(bad) = indices.iter().find(|&&index| index >= history.len()) {
                bail!("No history entry {bad} (history has {} entries)", history.len());
            }
            history.remove(&indices);
            writeln!(out, "History has {} entries", history.len())?;
        }
        HistoryAction::Clear => {
            history.clear();
            writeln!(out, "History cleared")?;
        }
    }

    save_history(config, &history)
}

/// Replace the playlist with the one saved before the last commit
pub fn restore_backup<W: Write>(config: &CanopyConfig, out: &mut W) -> Result<()> {
    let mut session = open_session(config)?;
    session.enter()?;
    if let Err(e) = session.restore_previous() {
        session.cancel();
        return Err(e.into());
    }
    commit(&mut session)?;

    writeln!(
        out,
        "Restored {} items from backup",
        session.tree().item_count()
    )?;
    Ok(())
}

/// Drop the `\\?\` prefix Windows puts on canonical local paths
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let stripped = path
        .to_str()
        .and_then(|text| text.strip_prefix(r"\\?\"))
        .filter(|rest| !rest.starts_with("UNC"))
        .map(PathBuf::from);
    stripped.unwrap_or(path)
}

/// Print where the cursor moved; `false` if it could not move
fn report_move<W: Write>(entry: Option<String>, out: &mut W) -> io::Result<bool> {
    match entry {
        Some(entry) => {
            writeln!(out, "{entry}")?;
            Ok(true)
        }
        None => {
            writeln!(out, "No entry in that direction")?;
            Ok(false)
        }
    }
}

fn open_session(config: &CanopyConfig) -> Result<EditSession> {
    let path = &config.paths.playlist;
    EditSession::open(path, config.session.clone())
        .with_context(|| format!("Failed to open playlist {}", path.display()))
}

fn commit(session: &mut EditSession) -> Result<()> {
    ensure_parent_dir(session.path())?;

    match session.commit() {
        Ok(CommitOutcome::Unchanged) => {
            debug!("Nothing to commit");
            Ok(())
        }
        Ok(CommitOutcome::Saved { .. }) => Ok(()),
        Err(e) => {
            session.cancel();
            Err(e).context("Failed to save playlist")
        }
    }
}

/// Sidecar holding the history cursor, `history.txt` -> `history.txt.cursor`
pub fn cursor_path(history: &Path) -> PathBuf {
    let mut name = history.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(CURSOR_SUFFIX);
    history.with_file_name(name)
}

fn load_history(config: &CanopyConfig) -> History {
    let path = &config.paths.history;
    let max_size = config.playback.history_size;

    let mut history = match History::load(path, max_size) {
        Ok(history) => history,
        Err(PlaybackError::Io(e)) if e.kind() == io::ErrorKind::NotFound => History::new(max_size),
        Err(e) => {
            warn!("Starting with empty history, {} is unreadable: {}", path.display(), e);
            History::new(max_size)
        }
    };

    if let Some(index) = load_cursor(&cursor_path(path)) {
        if !history.set_current_index(index) {
            warn!("Ignoring stale history cursor {:?}", index);
        }
    }
    history
}

/// Stored cursor; `Some(None)` is the multiple-items state
fn load_cursor(path: &Path) -> Option<Option<usize>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Failed to read history cursor {}: {}", path.display(), e);
            return None;
        }
    };

    match text.trim().parse::<isize>() {
        Ok(raw) => Some(usize::try_from(raw).ok()),
        Err(e) => {
            warn!("Ignoring malformed history cursor {}: {}", path.display(), e);
            None
        }
    }
}

fn save_history(config: &CanopyConfig, history: &History) -> Result<()> {
    let path = &config.paths.history;
    ensure_parent_dir(path)?;
    history
        .save(path)
        .with_context(|| format!("Failed to save history {}", path.display()))?;

    let cursor = cursor_path(path);
    write_atomic(&cursor, |writer| {
        writeln!(writer, "{}", history.raw_current_index())
    })
    .with_context(|| format!("Failed to save history cursor {}", cursor.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display())),
        _ => Ok(()),
    }
}
