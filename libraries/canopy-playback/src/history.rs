//! Playback history tracking
//!
//! Maintains a bounded log of played item paths with a movable cursor for
//! previous/next navigation.

use crate::error::{PlaybackError, Result};
use canopy_core::atomic::write_atomic;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Raw cursor value shells use for "several items / unknown item"
pub const MULTIPLE_ITEMS_INDEX: isize = -1;

/// Playback history with bounded size
///
/// Entries are most-recent-first. The cursor is either an index into the
/// entries or `None`, meaning the last playback event played several items
/// at once or an item whose identity is unknown. An empty history always
/// has a `None` cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    /// History buffer (most recent = front)
    entries: VecDeque<String>,

    /// Cursor into `entries`
    current: Option<usize>,

    /// Maximum history size
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size.min(1024)),
            current: None,
            max_size,
        }
    }

    /// Record a played item
    ///
    /// The entry becomes current. If history is full, the oldest entry is
    /// discarded. Does nothing when the maximum size is 0.
    pub fn push(&mut self, entry: impl Into<String>) {
        if self.max_size == 0 {
            return;
        }

        let entry = entry.into();
        if entry.contains(['\n', '\r']) {
            warn!("Ignoring history entry with a line break: {:?}", entry);
            return;
        }

        self.entries.push_front(entry);
        self.entries.truncate(self.max_size);
        self.current = Some(0);
    }

    /// Mark the last playback as several items at once
    pub fn played_multiple_items(&mut self) {
        self.current = None;
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&str> {
        self.current.and_then(|index| self.get(index))
    }

    /// Cursor position, `None` for the multiple-items state
    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Cursor position with [`MULTIPLE_ITEMS_INDEX`] for the multiple-items state
    pub fn raw_current_index(&self) -> isize {
        self.current
            .and_then(|index| isize::try_from(index).ok())
            .unwrap_or(MULTIPLE_ITEMS_INDEX)
    }

    /// Point the cursor at `index`, `None` for the multiple-items state
    ///
    /// Returns `false` and changes nothing when `index` is past the end.
    pub fn set_current_index(&mut self, index: Option<usize>) -> bool {
        if index.is_some_and(|index| index >= self.entries.len()) {
            return false;
        }
        self.current = index;
        true
    }

    /// Move to the next older entry
    ///
    /// From the multiple-items state this moves to the newest entry. Returns
    /// `None` and changes nothing when there is no older entry.
    pub fn previous(&mut self) -> Option<&str> {
        let target = self.current.map_or(0, |index| index + 1);
        self.move_to(target)
    }

    /// Move to the next newer entry
    ///
    /// Returns `None` and changes nothing at the newest entry or in the
    /// multiple-items state.
    pub fn next(&mut self) -> Option<&str> {
        let target = self.current?.checked_sub(1)?;
        self.move_to(target)
    }

    fn move_to(&mut self, target: usize) -> Option<&str> {
        if target >= self.entries.len() {
            return None;
        }
        self.current = Some(target);
        self.get(target)
    }

    /// Remove entries at arbitrary positions
    ///
    /// Out-of-range and duplicate indices are ignored. If the current entry
    /// is removed the cursor becomes unknown, otherwise it keeps pointing at
    /// the same entry.
    pub fn remove(&mut self, indices: &[usize]) {
        let mut doomed: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < self.entries.len())
            .collect();
        doomed.sort_unstable();
        doomed.dedup();

        if doomed.is_empty() {
            return;
        }

        self.current = match self.current {
            Some(current) if doomed.binary_search(&current).is_ok() => None,
            Some(current) => Some(current - doomed.partition_point(|&index| index < current)),
            None => None,
        };

        for &index in doomed.iter().rev() {
            self.entries.remove(index);
        }
    }

    /// Get entry by position (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// All entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    /// Whether `path` is among the `window` most recent entries
    pub fn is_recent(&self, path: &str, window: usize) -> bool {
        self.entries.iter().take(window).any(|entry| entry == path)
    }

    /// Get number of entries in history
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    /// Get maximum history size
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Set maximum history size
    ///
    /// If new size is smaller than current, oldest entries are discarded.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size;
        self.entries.truncate(max_size);

        if self.current.is_some_and(|index| index >= max_size) {
            self.current = None;
        }
    }

    /// Write entries one per line, most recent first
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(writer, "{entry}")?;
        }
        Ok(())
    }

    /// Read at most `max_size` entries
    ///
    /// Reading stops once the bound is reached, so a file written under a
    /// larger configured size costs no more than `max_size` lines.
    pub fn read_from<R: BufRead>(reader: R, max_size: usize) -> Result<Self> {
        let mut history = Self::new(max_size);

        for (index, line) in reader.lines().enumerate() {
            if history.entries.len() >= max_size {
                break;
            }

            let line = line.map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => PlaybackError::InvalidEntry { line: index + 1 },
                _ => PlaybackError::Io(e),
            })?;
            let entry = line.strip_suffix('\r').unwrap_or(&line);
            if entry.is_empty() {
                continue;
            }
            history.entries.push_back(entry.to_owned());
        }

        if !history.entries.is_empty() {
            history.current = Some(0);
        }
        Ok(history)
    }

    /// Persist history to `path`, replacing it atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, |writer| self.write_to(writer))?;
        debug!(path = %path.display(), entries = self.len(), "Saved history");
        Ok(())
    }

    /// Load history from `path`, keeping at most `max_size` entries
    ///
    /// On error callers should start from an empty history.
    pub fn load(path: &Path, max_size: usize) -> Result<Self> {
        let file = File::open(path)?;
        let history = Self::read_from(BufReader::new(file), max_size)?;
        debug!(path = %path.display(), entries = history.len(), "Loaded history");
        Ok(history)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50) // Default: 50 entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_with(max_size: usize, pushed: &[&str]) -> History {
        let mut history = History::new(max_size);
        for entry in pushed {
            history.push(*entry);
        }
        history
    }

    fn entries(history: &History) -> Vec<&str> {
        history.entries().collect()
    }

    #[test]
    fn create_history() {
        let history = History::new(10);
        assert_eq!(history.max_size(), 10);
        assert_eq!(history.len(), 0);
        assert!(history.is_empty());
        assert_eq!(history.current_index(), None);
        assert_eq!(history.raw_current_index(), MULTIPLE_ITEMS_INDEX);
    }

    #[test]
    fn set_current_index_checks_bounds() {
        let mut history = history_with(10, &["a", "b", "c"]);
        assert!(history.set_current_index(Some(2)));
        assert_eq!(history.current(), Some("a"));

        assert!(!history.set_current_index(Some(3)));
        assert_eq!(history.current_index(), Some(2));

        assert!(history.set_current_index(None));
        assert_eq!(history.raw_current_index(), MULTIPLE_ITEMS_INDEX);

        let mut empty = History::new(10);
        assert!(!empty.set_current_index(Some(0)));
        assert_eq!(empty.current_index(), None);
    }

    #[test]
    fn history_bounded() {
        let history = history_with(3, &["a", "b", "c", "d"]);
        assert_eq!(entries(&history), ["d", "c", "b"]);
        assert_eq!(history.current_index(), Some(0));
        assert_eq!(history.current(), Some("d"));
    }

    #[test]
    fn push_with_zero_size_is_noop() {
        let mut history = History::new(0);
        history.push("a");
        assert!(history.is_empty());
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn push_resets_cursor() {
        let mut history = history_with(10, &["a", "b", "c"]);
        history.previous();
        history.previous();
        assert_eq!(history.current(), Some("a"));

        history.push("d");
        assert_eq!(history.current_index(), Some(0));
        assert_eq!(history.current(), Some("d"));
    }

    #[test]
    fn previous_and_next_navigate() {
        let mut history = history_with(10, &["a", "b", "c"]);

        assert_eq!(history.next(), None);
        assert_eq!(history.current_index(), Some(0));

        assert_eq!(history.previous(), Some("b"));
        assert_eq!(history.previous(), Some("a"));
        assert_eq!(history.previous(), None);
        assert_eq!(history.current_index(), Some(2));

        assert_eq!(history.next(), Some("b"));
        assert_eq!(history.next(), Some("c"));
        assert_eq!(history.next(), None);
    }

    #[test]
    fn multiple_items_state() {
        let mut history = history_with(10, &["a", "b"]);
        history.played_multiple_items();
        assert_eq!(history.current(), None);
        assert_eq!(history.len(), 2);

        assert_eq!(history.next(), None);
        assert_eq!(history.current_index(), None);

        assert_eq!(history.previous(), Some("b"));
        assert_eq!(history.current_index(), Some(0));
    }

    #[test]
    fn previous_on_empty_history() {
        let mut history = History::new(5);
        assert_eq!(history.previous(), None);
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn remove_keeps_cursor_on_same_entry() {
        let mut history = history_with(10, &["a", "b", "c", "d", "e"]);
        // entries: e d c b a
        history.previous();
        history.previous();
        history.previous();
        assert_eq!(history.current(), Some("b"));

        history.remove(&[4, 0, 2, 0, 99]);
        assert_eq!(entries(&history), ["d", "b"]);
        assert_eq!(history.current(), Some("b"));
        assert_eq!(history.current_index(), Some(1));
    }

    #[test]
    fn remove_current_becomes_unknown() {
        let mut history = history_with(10, &["a", "b", "c"]);
        history.previous();
        history.remove(&[1]);
        assert_eq!(entries(&history), ["c", "a"]);
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn remove_everything() {
        let mut history = history_with(10, &["a", "b"]);
        history.remove(&[0, 1]);
        assert!(history.is_empty());
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn resize_history() {
        let mut history = history_with(5, &["1", "2", "3", "4", "5"]);
        history.set_max_size(3);
        assert_eq!(history.max_size(), 3);
        assert_eq!(entries(&history), ["5", "4", "3"]);
        assert_eq!(history.current_index(), Some(0));
    }

    #[test]
    fn shrinking_past_cursor_clears_it() {
        let mut history = history_with(5, &["1", "2", "3", "4", "5"]);
        for _ in 0..4 {
            history.previous();
        }
        assert_eq!(history.current(), Some("1"));

        history.set_max_size(2);
        assert_eq!(history.current_index(), None);
    }

    #[test]
    fn increase_max_size() {
        let mut history = history_with(3, &["1", "2"]);
        history.set_max_size(10);
        assert_eq!(history.max_size(), 10);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn is_recent_respects_window() {
        let history = history_with(10, &["a", "b", "c"]);
        assert!(history.is_recent("c", 1));
        assert!(!history.is_recent("b", 1));
        assert!(history.is_recent("a", 3));
        assert!(!history.is_recent("a", 0));
    }

    #[test]
    fn rejects_multiline_entry() {
        let mut history = History::new(5);
        history.push("a\nb");
        assert!(history.is_empty());
    }

    #[test]
    fn read_truncates_to_max_size() {
        let history = History::read_from("e\nd\n\nc\nb\na\n".as_bytes(), 3).unwrap();
        assert_eq!(entries(&history), ["e", "d", "c"]);
        assert_eq!(history.current_index(), Some(0));
        assert_eq!(history.max_size(), 3);
    }

    #[test]
    fn read_rejects_invalid_utf8() {
        let bytes: &[u8] = b"ok\n\xff\xfe\n";
        let err = History::read_from(bytes, 10).unwrap_err();
        assert!(matches!(err, PlaybackError::InvalidEntry { line: 2 }));
    }

    #[test]
    fn write_then_read() {
        let history = history_with(10, &["/x/a.mp3", "/x/b.mp3"]);
        let mut bytes = Vec::new();
        history.write_to(&mut bytes).unwrap();
        assert_eq!(bytes, b"/x/b.mp3\n/x/a.mp3\n");

        let restored = History::read_from(bytes.as_slice(), 10).unwrap();
        assert_eq!(restored, history);
    }

    #[test]
    fn default_history() {
        let history = History::default();
        assert_eq!(history.max_size(), 50);
    }
}
