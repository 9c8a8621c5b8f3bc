//! Mock Audio Player for Testing
//!
//! Records all played URLs for verification.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone)]
pub struct MockAudio {
    pub played: Arc<Mutex<Vec<String>>>,
    /// Simulate failure on every play
    pub should_fail: Arc<Mutex<bool>>,
}

impl MockAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }

    pub fn was_played(&self, fragment: &str) -> bool {
        self.played.lock().unwrap().iter().any(|u| u.contains(fragment))
    }
}

#[async_trait]
impl lexitalk::audio::AudioPlayer for MockAudio {
    async fn play(&self, url: &str) -> Result<()> {
        self.played.lock().unwrap().push(url.to_string());
        if *self.should_fail.lock().unwrap() {
            return Err(anyhow::anyhow!("Mock audio failure"));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
