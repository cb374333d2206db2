//! User settings persisted in the platform config directory

use anyhow::{anyhow, Context, Result};
use fieldkit_core::{Theme, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings applied to every document unless the command line says otherwise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Version of the settings format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Zone used for time fields
    #[serde(default)]
    pub time_zone: TimeZone,
    /// Built-in theme name, `dark` or `light`
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Template variables available to matcher options and links
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
}

fn default_version() -> u32 {
    1
}

fn default_theme() -> String {
    "dark".to_string()
}

impl Settings {
    /// Load settings from disk, falling back to defaults when no file exists
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Save settings to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    /// Get the settings file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("org", "fieldkit", "fieldkit")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("settings.json"))
    }

    /// Load settings from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("Invalid settings file {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }

    /// The configured theme
    pub fn theme(&self) -> Result<Theme> {
        Theme::by_name(&self.theme).ok_or_else(|| anyhow!("Unknown theme: {}", self.theme))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            time_zone: TimeZone::default(),
            theme: default_theme(),
            variables: BTreeMap::new(),
        }
    }
}
