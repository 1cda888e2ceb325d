//! Configuration management
//!
//! Persistent settings with schema versioning and migrations, stored in
//! `~/.talkback/config.json`. Loading falls back to defaults when the file
//! is missing; older schemas are migrated sequentially and re-saved.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Current config schema version
const CURRENT_VERSION: u32 = 1;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migrations
    pub version: u32,
    /// Completion backend settings
    pub backend: BackendConfig,
    /// Audio input settings
    pub audio: AudioConfig,
    /// Speech synthesis settings
    pub speech: SpeechConfig,
    /// Assistant behaviour settings
    pub assistant: AssistantConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            backend: BackendConfig::default(),
            audio: AudioConfig::default(),
            speech: SpeechConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Chat completion endpoint URL
    pub endpoint: String,
    /// API key sent with each request (empty means not configured)
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/chat".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Audio input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Selected audio input device ID (None for system default)
    pub device_id: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { device_id: None }
    }
}

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Speaking rate multiplier
    pub rate: f32,
    /// Voice pitch multiplier
    pub pitch: f32,
    /// Playback volume, 0.0-1.0
    pub volume: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

/// Assistant behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Selected mode ID
    pub mode_id: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            mode_id: "general".to_string(),
        }
    }
}

/// Get the path to the config file (~/.talkback/config.json)
pub fn get_config_path() -> PathBuf {
    home_dir_or_fallback().join(".talkback").join("config.json")
}

/// Get the home directory, falling back to /tmp if unavailable
fn home_dir_or_fallback() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| {
        tracing::error!("Could not determine home directory, using /tmp");
        PathBuf::from("/tmp")
    })
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from(&get_config_path()).unwrap_or_else(|e| {
            tracing::error!("Failed to load config, using defaults: {}", e);
            Config::default()
        })
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse config: {}", e))?;

        migrate_config(config, path)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create config directory: {}", e))?;
            }
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialise config: {}", e))?;

        fs::write(path, contents).map_err(|e| format!("Failed to write config file: {}", e))?;

        tracing::info!("Config saved to disk: mode_id={}", self.assistant.mode_id);
        Ok(())
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&get_config_path())
    }
}

/// Migrate configuration from older schema versions
fn migrate_config(mut config: Config, path: &Path) -> Result<Config, String> {
    let original_version = config.version;

    // Apply migrations sequentially
    while config.version < CURRENT_VERSION {
        config = apply_migration(config)?;
    }

    if config.version != original_version {
        tracing::info!(
            "Migrated config from version {} to {}",
            original_version,
            config.version
        );
        // Save the migrated config
        config.save_to(path)?;
    }

    Ok(config)
}

/// Apply a single migration step
fn apply_migration(config: Config) -> Result<Config, String> {
    match config.version {
        // Version 0 -> 1: Initial migration (add any new fields)
        0 => {
            let mut migrated = config;
            migrated.version = 1;
            // Future migrations would add field transformations here
            Ok(migrated)
        }
        v => Err(format!("Unknown config version: {}", v)),
    }
}
