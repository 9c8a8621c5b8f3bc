use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Server
    pub server_url: String,
    pub request_timeout_secs: u64,

    // Audio
    pub audio_enabled: bool,

    // Speech
    pub dictation_enabled: bool,
    pub speech_language: String,
    pub listen_timeout_secs: u64,
    pub vosk_model_path: String,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
            audio_enabled: true,
            dictation_enabled: true,
            speech_language: "en-US".to_string(),
            listen_timeout_secs: 8,
            vosk_model_path: dirs::data_dir()
                .unwrap_or_default()
                .join("lexitalk/models/vosk-model-small-en-us")
                .to_string_lossy()
                .to_string(),
            log_level: "INFO".to_string(),
        }
    }
}

impl Config {
    /// Load config from the default location, creating it on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load config from an explicit file. A missing file is written with
    /// defaults; a corrupt one is moved aside and defaults are used.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            match config.save_to(path) {
                Ok(()) => tracing::info!("📝 Wrote default config to {}", path.display()),
                Err(e) => tracing::warn!("⚠️ Could not write default config: {}", e),
            }
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lexitalk")
        .join("config.json")
}
