//! CLI configuration

use canopy_playback::PlaybackConfig;
use canopy_session::SessionConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "canopy.toml";

/// Prefix of environment overrides, e.g. `CANOPY_PLAYBACK__HISTORY_SIZE=20`
pub const ENV_PREFIX: &str = "CANOPY";

/// Everything the binary needs to know
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CanopyConfig {
    /// Data file locations
    #[serde(default = "default_paths")]
    pub paths: PathSettings,

    /// History and random selection
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Edit session options
    #[serde(default)]
    pub session: SessionConfig,
}

/// Where playlist data lives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathSettings {
    /// Committed playlist tree
    #[serde(default = "default_playlist")]
    pub playlist: PathBuf,

    /// Playback history log
    #[serde(default = "default_history")]
    pub history: PathBuf,
}

impl CanopyConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `file` must exist; without one, `canopy.toml` in the
    /// working directory is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(file, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`CanopyConfig::load`] with a caller-provided environment source
    pub fn load_with_env(file: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        settings = match file {
            Some(path) => settings.add_source(File::from(path).required(true)),
            None => settings.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        // Nested keys use a double underscore: CANOPY_PATHS__PLAYLIST
        settings = settings.add_source(
            env.prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        settings.build()?.try_deserialize()
    }
}

impl Default for CanopyConfig {
    fn default() -> Self {
        Self {
            paths: default_paths(),
            playback: PlaybackConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

// Default values
fn default_paths() -> PathSettings {
    PathSettings {
        playlist: default_playlist(),
        history: default_history(),
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("canopy")
}

fn default_playlist() -> PathBuf {
    data_dir().join("playlist.txt")
}

fn default_history() -> PathBuf {
    data_dir().join("history.txt")
}
