//! Configuration for playback management

use serde::{Deserialize, Serialize};

/// Configuration for history and random selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Maximum history size (default: 50)
    pub history_size: usize,

    /// How many recently played items random selection tries to skip
    /// (default: 10, capped at 80% of the item count when choosing)
    pub recent_skip_count: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            history_size: 50,
            recent_skip_count: 10,
        }
    }
}
