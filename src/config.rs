//! Tool configuration persistence
//!
//! Stores default document options in `~/.config/iniedit/config.yaml`

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ini::{Comparison, DocumentOptions, TextEncoding};

/// Defaults applied to every document the tool opens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// How section and key names are compared ("ignore-case" or "case-sensitive")
    #[serde(default)]
    pub comparison: Comparison,

    /// Decode backslash escapes in values
    #[serde(default)]
    pub allow_escapes: bool,

    /// Encoding assumed for files without a byte-order mark (e.g., "utf-16le")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<TextEncoding>,

    /// Write debug logs to the logs directory
    #[serde(default = "default_file_logging")]
    pub file_logging: bool,
}

fn default_file_logging() -> bool {
    true
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            comparison: Comparison::default(),
            allow_escapes: false,
            encoding: None,
            file_logging: default_file_logging(),
        }
    }
}

impl ToolConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from a specific file, or return defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let dir = crate::config_paths::ensure_config_dir()?;
        self.save_to(&dir.join("config.yaml"))
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Document options these defaults describe
    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            comparison: self.comparison,
            allow_escapes: self.allow_escapes,
            encoding: self.encoding,
        }
    }
}
