//! Random item selection
//!
//! Picks a playable item uniformly at random by drawing a pre-order item
//! number and letting the tree translate it into a path, so no flattened
//! item list is built per draw.
//!
//! The recency-avoiding variant uses rejection sampling: draw until the
//! item is not among the most recently played ones. The exclusion window
//! is capped at 80% of the item count, so the expected number of draws
//! `item_count / (item_count - window)` never exceeds 5. For very small
//! playlists this means recently played items can come back sooner than
//! the configured skip count asks for.

use crate::history::History;
use canopy_core::Tree;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Source of "was this played recently" answers
pub trait RecentItems {
    /// Whether `path` is among the `window` most recent entries
    fn is_recent(&self, path: &str, window: usize) -> bool;
}

impl RecentItems for History {
    fn is_recent(&self, path: &str, window: usize) -> bool {
        History::is_recent(self, path, window)
    }
}

/// Most recent first
impl<S: AsRef<str>> RecentItems for [S] {
    fn is_recent(&self, path: &str, window: usize) -> bool {
        self.iter().take(window).any(|entry| entry.as_ref() == path)
    }
}

/// Effective exclusion window: `min(configured, floor(0.8 * item_count))`
///
/// ```
/// use canopy_playback::recent_window;
///
/// assert_eq!(recent_window(10, 9), 8);
/// assert_eq!(recent_window(10, 3), 3);
/// assert_eq!(recent_window(1, 5), 0);
/// ```
pub fn recent_window(item_count: usize, configured_skip_count: usize) -> usize {
    // floor(4n / 5) without overflowing for huge n
    let cap = item_count / 5 * 4 + item_count % 5 * 4 / 5;
    configured_skip_count.min(cap)
}

/// Uniform random item picker
#[derive(Debug, Clone)]
pub struct RandomItemChooser<R = StdRng> {
    rng: R,
}

impl RandomItemChooser<StdRng> {
    /// Create a chooser seeded from the operating system
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a deterministic chooser
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RandomItemChooser<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomItemChooser<R> {
    /// Create a chooser over any random number generator
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Draw a pre-order item number, `None` for a tree without items
    pub fn random_item(&mut self, tree: &Tree) -> Option<usize> {
        let item_count = tree.item_count();
        if item_count == 0 {
            return None;
        }
        Some(self.rng.gen_range(0..item_count))
    }

    /// Path of a uniformly chosen playable item
    ///
    /// `None` means the playlist has nothing to play; callers stop playback
    /// rather than treat it as an error.
    pub fn random_path(&mut self, tree: &Tree) -> Option<String> {
        let item = self.random_item(tree)?;
        tree.item_path(item)
    }

    /// Path of a random playable item that was not played recently
    ///
    /// Items among the [`recent_window`] most recent entries of `recent`
    /// are redrawn.
    pub fn random_path_avoiding<H>(
        &mut self,
        tree: &Tree,
        recent: &H,
        configured_skip_count: usize,
    ) -> Option<String>
    where
        H: RecentItems + ?Sized,
    {
        let window = recent_window(tree.item_count(), configured_skip_count);
        let mut draws: u32 = 0;

        loop {
            draws += 1;
            let path = self.random_path(tree)?;
            if window == 0 || !recent.is_recent(&path, window) {
                trace!(draws, window, path = %path, "Picked random item");
                return Some(path);
            }
        }
    }
}
