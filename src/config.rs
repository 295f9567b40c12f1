use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

const CONFIG_FILE: &str = "player.json";

/// Tunables for the player screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub title: String,
    /// Delay between two progress sync ticks.
    pub tick_interval_ms: u64,
    /// Linear gain, 1.0 is unity.
    pub volume: f32,
    pub window: WindowConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            title: "Calm Down".to_string(),
            tick_interval_ms: 1000,
            volume: 0.5,
            window: WindowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 420.0,
            height: 220.0,
        }
    }
}

impl PlayerConfig {
    /// Reads `player.json` next to the executable, falling back to defaults.
    pub fn load_or_default() -> Self {
        let path = exe_dir().join(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match Self::from_path(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded player config");
                config
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable config");
                Self::default()
            }
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(text)?;
        config.tick_interval_ms = config.tick_interval_ms.max(1);
        Ok(config)
    }
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
}
