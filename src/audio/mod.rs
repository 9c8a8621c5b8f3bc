//! Audio playback of server speech
//!
//! Playback is fire-and-forget: a failure is logged by the caller and never
//! reaches the user.

#[cfg(feature = "playback")]
pub mod engine;

use crate::config::Config;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Trait for audio players
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Begin playing the audio at `url`
    async fn play(&self, url: &str) -> Result<()>;

    fn name(&self) -> &str;
}

/// Player used when audio is disabled or unavailable
#[derive(Debug, Default)]
pub struct SilentPlayer;

#[async_trait]
impl AudioPlayer for SilentPlayer {
    async fn play(&self, url: &str) -> Result<()> {
        debug!("🔇 Skipping playback of {}", url);
        Ok(())
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Factory to create the configured player
pub fn create_player(config: &Config, http: reqwest::Client) -> Arc<dyn AudioPlayer> {
    if !config.audio_enabled {
        info!("🔇 Audio playback disabled");
        return Arc::new(SilentPlayer);
    }

    #[cfg(feature = "playback")]
    {
        match engine::SoundEngine::new(http) {
            Ok(engine) => {
                info!("🔊 Audio playback via {}", engine.name());
                return Arc::new(engine);
            }
            Err(e) => tracing::warn!("🔇 Failed to initialise audio output: {}", e),
        }
    }

    #[cfg(not(feature = "playback"))]
    {
        drop(http);
        info!("🔇 Audio playback not compiled in");
    }

    Arc::new(SilentPlayer)
}
