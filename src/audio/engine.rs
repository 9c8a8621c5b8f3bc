//! Sound Engine for speech playback
//!
//! rodio's output stream is not Send, so one thread owns it and plays the
//! bytes it is handed over a channel. Downloads stay on the async side.

use super::AudioPlayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Cursor;
use std::sync::mpsc;
use std::thread;
use tracing::{debug, error, info, warn};

/// Commands sent to the audio thread
enum AudioCommand {
    PlayBytes { label: String, bytes: Vec<u8> },
}

/// Thread-safe handle to the sound engine
#[derive(Clone)]
pub struct SoundEngine {
    sender: mpsc::Sender<AudioCommand>,
    http: reqwest::Client,
}

impl std::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEngine").finish()
    }
}

impl SoundEngine {
    pub fn new(http: reqwest::Client) -> Result<Self> {
        let (sender, receiver) = mpsc::channel::<AudioCommand>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), String>>();

        thread::spawn(move || {
            Self::audio_thread(receiver, ready_tx);
        });

        ready_rx
            .recv()
            .context("Audio thread exited during start-up")?
            .map_err(|e| anyhow::anyhow!(e))?;

        Ok(Self { sender, http })
    }

    fn audio_thread(receiver: mpsc::Receiver<AudioCommand>, ready: mpsc::Sender<Result<(), String>>) {
        use rodio::OutputStream;

        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        // Keep stream alive
        let _stream = stream;
        let sink = match rodio::Sink::try_new(&stream_handle) {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };
        let _ = ready.send(Ok(()));

        info!("🔊 Audio thread started");

        while let Ok(cmd) = receiver.recv() {
            match cmd {
                AudioCommand::PlayBytes { label, bytes } => {
                    match rodio::Decoder::new(Cursor::new(bytes)) {
                        Ok(source) => {
                            debug!("🔊 Queueing: {}", label);
                            sink.append(source);
                        }
                        Err(e) => error!("❌ Could not decode {}: {}", label, e),
                    }
                }
            }
        }

        info!("🔇 Audio thread stopped");
    }
}

#[async_trait]
impl AudioPlayer for SoundEngine {
    async fn play(&self, url: &str) -> Result<()> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("🔇 Speech download failed ({}): {}", status, url);
            anyhow::bail!("speech download returned {}", status);
        }
        let bytes = response.bytes().await?.to_vec();

        self.sender
            .send(AudioCommand::PlayBytes {
                label: url.to_string(),
                bytes,
            })
            .map_err(|e| anyhow::anyhow!("Audio thread disconnected: {}", e))
    }

    fn name(&self) -> &str {
        "rodio"
    }
}
