//! Edit session configuration

use serde::{Deserialize, Serialize};

/// Options applied when committing a working copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Remove dead branches before saving (default: true)
    pub auto_clean_up: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            auto_clean_up: true,
        }
    }
}
