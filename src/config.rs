//! Session configuration

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Tunables for an edit session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditableConfig {
    /// Maximum retained undo/redo snapshots
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Minimum elapsed time between unforced history snapshots
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Continue the current line's leading whitespace on line breaks
    #[serde(default = "default_true")]
    pub continue_indentation: bool,
    /// Text inserted for the Tab key (empty string disables handling)
    #[serde(default = "default_tab_text")]
    pub tab_text: String,
}

fn default_history_capacity() -> usize {
    500
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_tab_text() -> String {
    "  ".to_string()
}

impl Default for EditableConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            debounce_ms: default_debounce_ms(),
            continue_indentation: default_true(),
            tab_text: default_tab_text(),
        }
    }
}

impl EditableConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parsing editable config")
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("serializing editable config")
    }

    /// Load config from disk, or return defaults if the file is missing
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Save config to disk, creating parent directories as needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating config directory {}", parent.display()))?;
        }
        std::fs::write(path, self.to_json()?)
            .with_context(|| format!("writing config to {}", path.display()))?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }
}
