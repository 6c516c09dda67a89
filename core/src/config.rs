//! Host configuration (config.toml)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory. Every field has a default, so partial files are fine.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

/// Host configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// Canvas settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Asset manifest
    #[serde(default)]
    pub assets: AssetsConfig,
    /// Audio settings
    #[serde(default)]
    pub audio: AudioConfig,
    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Canvas configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Logical canvas width in pixels (default: 320)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Logical canvas height in pixels (default: 240)
    #[serde(default = "default_height")]
    pub height: u32,
    /// Scale applied after a successful init (default: 3)
    #[serde(default = "default_scale")]
    pub default_scale: u32,
}

/// Asset manifest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetsConfig {
    /// Directory or URL assets are fetched relative to (default: ".")
    #[serde(default = "default_asset_base")]
    pub base: String,
    /// Asset names, in the order they are placed in memory
    #[serde(default = "default_asset_files")]
    pub files: Vec<String>,
}

/// Audio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Whether an output device may be opened at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Master volume level (default: 0.8, range: 0.0-1.0)
    #[serde(default = "default_volume")]
    pub master_volume: f32,
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Persist values across runs (default: true)
    #[serde(default = "default_true")]
    pub durable: bool,
    /// Storage file; defaults to `storage.json` in the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_width() -> u32 {
    320
}
fn default_height() -> u32 {
    240
}
fn default_scale() -> u32 {
    3
}
fn default_asset_base() -> String {
    ".".to_string()
}
fn default_asset_files() -> Vec<String> {
    [
        "assets/sfx_deathscream_human2.wav",
        "assets/sfx_exp_cluster7.wav",
        "assets/sfx_exp_short_soft10.wav",
        "assets/sfx_sounds_impact1.wav",
        "assets/sfx_sounds_interaction5.wav",
        "assets/sfx_sounds_powerup10.wav",
        "assets/sfx_sounds_powerup4.wav",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f32 {
    0.8
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            default_scale: default_scale(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base: default_asset_base(),
            files: default_asset_files(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            master_volume: default_volume(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            durable: default_true(),
            path: None,
        }
    }
}

impl HostConfig {
    /// Reject configurations the host cannot run with
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in &self.assets.files {
            if !seen.insert(name.as_str()) {
                bail!("Asset '{name}' is listed more than once");
            }
        }
        if self.display.width == 0 || self.display.height == 0 {
            bail!(
                "Canvas size {}x{} is empty",
                self.display.width,
                self.display.height
            );
        }
        if !(0.0..=1.0).contains(&self.audio.master_volume) {
            bail!(
                "audio.master_volume {} is outside 0.0-1.0",
                self.audio.master_volume
            );
        }
        Ok(())
    }

    /// Storage file to use, or `None` when durable storage is disabled or no
    /// data directory exists
    pub fn storage_path(&self) -> Option<PathBuf> {
        if !self.storage.durable {
            return None;
        }
        self.storage
            .path
            .clone()
            .or_else(|| data_dir().map(|dir| dir.join("storage.json")))
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.oxid", "", "Oxid").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Returns the platform-specific data directory, where storage lives.
///
/// Returns `None` if the home directory cannot be determined.
pub fn data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.oxid", "", "Oxid").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Loads the configuration from `config.toml` in the configuration directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> HostConfig {
    config_dir()
        .map(|dir| load_from(&dir.join("config.toml")))
        .unwrap_or_default()
}

/// Loads the configuration from an explicit file, falling back to defaults
pub fn load_from(path: &Path) -> HostConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No config file; using defaults");
            return HostConfig::default();
        }
    };
    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Invalid config file; using defaults");
            HostConfig::default()
        }
    }
}
