//! Assistant mode catalog
//!
//! A mode is a named persona profile selecting the system instruction sent
//! with each backend request. Built-in modes are compiled in; custom modes
//! are stored in `~/.talkback/modes.json`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// A persona profile with the instruction it contributes to requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    /// Unique identifier for the mode
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// System instruction sent with each request in this mode
    pub instruction: String,
    /// Whether this is a built-in mode (cannot be deleted)
    pub is_builtin: bool,
}

/// Mode id used when a requested id is unrecognised.
pub const DEFAULT_MODE_ID: &str = "general";

/// Get the built-in modes.
pub fn builtin_modes() -> Vec<Mode> {
    vec![
        Mode {
            id: "general".to_string(),
            name: "General".to_string(),
            instruction: "You are a helpful voice assistant. Provide clear, concise responses."
                .to_string(),
            is_builtin: true,
        },
        Mode {
            id: "creative".to_string(),
            name: "Creative".to_string(),
            instruction:
                "You are a creative assistant. Think outside the box and provide imaginative, innovative ideas."
                    .to_string(),
            is_builtin: true,
        },
        Mode {
            id: "technical".to_string(),
            name: "Technical".to_string(),
            instruction:
                "You are a technical expert. Provide detailed, accurate technical information and solutions."
                    .to_string(),
            is_builtin: true,
        },
        Mode {
            id: "wellness".to_string(),
            name: "Wellness".to_string(),
            instruction:
                "You are a wellness coach. Provide supportive, health-focused guidance and motivation."
                    .to_string(),
            is_builtin: true,
        },
        Mode {
            id: "productivity".to_string(),
            name: "Productivity".to_string(),
            instruction:
                "You are a productivity assistant. Help users organize, plan, and optimize their tasks efficiently."
                    .to_string(),
            is_builtin: true,
        },
        Mode {
            id: "learning".to_string(),
            name: "Learning".to_string(),
            instruction:
                "You are a learning tutor. Explain concepts clearly and help users understand complex topics."
                    .to_string(),
            is_builtin: true,
        },
    ]
}

/// Get the path to the custom modes file.
pub fn custom_modes_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".talkback")
        .join("modes.json")
}

/// Load custom modes from disk; missing or unparseable files yield an
/// empty list rather than an error.
pub fn load_custom_modes(path: &Path) -> Vec<Mode> {
    if !path.exists() {
        return Vec::new();
    }

    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse custom modes: {}", e);
            Vec::new()
        }),
        Err(e) => {
            tracing::warn!("Failed to read custom modes file: {}", e);
            Vec::new()
        }
    }
}

/// Add or update a custom mode on disk.
pub fn save_custom_mode(path: &Path, mode: &Mode) -> Result<(), String> {
    if mode.is_builtin {
        return Err("Cannot save a built-in mode as custom".to_string());
    }
    if mode.id.is_empty() {
        return Err("Mode ID cannot be empty".to_string());
    }
    if mode.name.is_empty() {
        return Err("Mode name cannot be empty".to_string());
    }
    if mode.instruction.is_empty() {
        return Err("Mode instruction cannot be empty".to_string());
    }
    if builtin_modes().iter().any(|m| m.id == mode.id) {
        return Err(format!("Mode id '{}' is reserved by a built-in mode", mode.id));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    let mut modes = load_custom_modes(path);
    if let Some(existing) = modes.iter_mut().find(|m| m.id == mode.id) {
        *existing = mode.clone();
    } else {
        modes.push(mode.clone());
    }

    let content =
        serde_json::to_string_pretty(&modes).map_err(|e| format!("Failed to serialise: {}", e))?;
    fs::write(path, content).map_err(|e| format!("Failed to write modes file: {}", e))?;

    tracing::info!("Saved custom mode: {}", mode.id);
    Ok(())
}

/// Delete a custom mode from disk.
pub fn delete_custom_mode(path: &Path, mode_id: &str) -> Result<(), String> {
    if builtin_modes().iter().any(|m| m.id == mode_id) {
        return Err("Cannot delete a built-in mode".to_string());
    }

    let mut modes = load_custom_modes(path);
    let original_len = modes.len();
    modes.retain(|m| m.id != mode_id);

    if modes.len() == original_len {
        return Err(format!("Mode '{}' not found", mode_id));
    }

    let content =
        serde_json::to_string_pretty(&modes).map_err(|e| format!("Failed to serialise: {}", e))?;
    fs::write(path, content).map_err(|e| format!("Failed to write modes file: {}", e))?;

    tracing::info!("Deleted custom mode: {}", mode_id);
    Ok(())
}

/// The ordered mode list the controller resolves instructions from.
#[derive(Debug, Clone)]
pub struct ModeCatalog {
    modes: Vec<Mode>,
}

impl Default for ModeCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModeCatalog {
    /// Catalog with only the built-in modes.
    pub fn builtin() -> Self {
        Self {
            modes: builtin_modes(),
        }
    }

    /// Catalog with built-in modes plus custom modes from the given file.
    pub fn load(custom_path: &Path) -> Self {
        let mut modes = builtin_modes();
        modes.extend(load_custom_modes(custom_path));
        Self { modes }
    }

    /// Catalog with built-in modes plus custom modes from the default path.
    pub fn load_default() -> Self {
        Self::load(&custom_modes_path())
    }

    /// All modes, built-in first, in catalog order.
    pub fn modes(&self) -> &[Mode] {
        &self.modes
    }

    /// Look up a mode by id.
    pub fn get(&self, id: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.id == id)
    }

    /// Resolve the instruction for a mode id.
    ///
    /// An unrecognised id falls back to the general instruction. The
    /// original UI silently applied the same default; preserved here as
    /// documented behaviour.
    pub fn instruction_for(&self, id: &str) -> &str {
        self.get(id)
            .or_else(|| self.get(DEFAULT_MODE_ID))
            .map(|m| m.instruction.as_str())
            .unwrap_or("You are a helpful voice assistant. Provide clear, concise responses.")
    }
}
