//! Persisted output path preference.
//!
//! A `settings.json` next to the executable remembers whether artifacts go
//! beside the binary or under a custom base folder. Loading is forgiving: a
//! missing or unreadable file falls back to defaults so a stale settings file
//! never blocks a conversion run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_use_default_path")]
    pub use_default_path: bool,
    #[serde(default)]
    pub custom_output_path: String,
}

fn default_use_default_path() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            use_default_path: true,
            custom_output_path: String::new(),
        }
    }
}

impl Settings {
    /// Location of the settings file, next to the executable.
    pub fn path() -> PathBuf {
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."))
            .join(SETTINGS_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("failed to serialize settings")?;
        fs::write(path, text)
            .with_context(|| format!("failed to write settings to {}", path.display()))
    }

    /// Base folder the `Output/` tree is created under.
    pub fn output_base(&self) -> PathBuf {
        if !self.use_default_path && !self.custom_output_path.is_empty() {
            PathBuf::from(&self.custom_output_path)
        } else {
            Self::path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        }
    }
}
