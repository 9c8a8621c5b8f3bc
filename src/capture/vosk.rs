//! Offline dictation using cpal capture and a Vosk model

use super::{Dictation, DictationEvent, DictationSink};
use crate::config::Config;
use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use vosk::{Model, Recognizer};

const SAMPLE_RATE: u32 = 16000;
const CHUNK_SIZE: usize = 1024;

/// Vosk-backed dictation. Each session runs on its own capture thread.
pub struct VoskDictation {
    model: Arc<Model>,
    sink: DictationSink,
    listen_timeout: Duration,
    active: Option<Arc<AtomicBool>>,
}

impl VoskDictation {
    pub fn new(config: &Config, sink: DictationSink) -> Result<Self> {
        let model_path = PathBuf::from(&config.vosk_model_path);
        if !model_path.exists() {
            anyhow::bail!("Vosk model not found at {}", model_path.display());
        }

        cpal::default_host()
            .default_input_device()
            .context("No default input device")?;

        info!(
            "Loading Vosk model from: {} ({})",
            model_path.display(),
            config.speech_language
        );
        let model = Model::new(model_path.to_string_lossy()).context("Failed to load Vosk model")?;

        Ok(Self {
            model: Arc::new(model),
            sink,
            listen_timeout: Duration::from_secs(config.listen_timeout_secs.max(1)),
            active: None,
        })
    }
}

impl Dictation for VoskDictation {
    fn start(&mut self) -> Result<()> {
        self.stop();

        let mut recognizer = Recognizer::new(&self.model, SAMPLE_RATE as f32)
            .context("Failed to create Vosk recognizer")?;
        let stop = Arc::new(AtomicBool::new(false));
        self.active = Some(stop.clone());

        let sink = self.sink.clone();
        let timeout = self.listen_timeout;
        thread::spawn(move || {
            let event = match listen(&mut recognizer, &stop, timeout) {
                Ok(Some(text)) => DictationEvent::Transcript(text),
                Ok(None) => DictationEvent::Error("no-speech".to_string()),
                Err(e) => {
                    warn!("Dictation failed: {}", e);
                    DictationEvent::Error("audio-capture".to_string())
                }
            };
            let _ = sink.send(event);
            let _ = sink.send(DictationEvent::End);
        });

        Ok(())
    }

    fn stop(&mut self) {
        if let Some(flag) = self.active.take() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    fn name(&self) -> &str {
        "vosk"
    }
}

/// Capture until a final result, a stop request, or the timeout
fn listen(
    recognizer: &mut Recognizer,
    stop: &AtomicBool,
    timeout: Duration,
) -> Result<Option<String>> {
    let device = cpal::default_host()
        .default_input_device()
        .context("No default input device")?;

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Fixed(CHUNK_SIZE as u32),
    };

    let (tx, rx) = mpsc::channel::<Vec<i16>>();
    let stream = device.build_input_stream(
        &config,
        move |data: &[i16], _: &cpal::InputCallbackInfo| {
            let _ = tx.send(data.to_vec());
        },
        |err| {
            warn!("Audio stream error: {}", err);
        },
        None,
    )?;
    stream.play()?;

    let started = Instant::now();
    loop {
        if stop.load(Ordering::SeqCst) || started.elapsed() >= timeout {
            break;
        }
        let Ok(samples) = rx.recv_timeout(Duration::from_millis(100)) else {
            continue;
        };
        match recognizer.accept_waveform(&samples) {
            vosk::DecodingState::Finalized => break,
            vosk::DecodingState::Running => {
                debug!("Partial: {}", recognizer.partial_result().partial);
            }
            vosk::DecodingState::Failed => {
                debug!("Decoding failed for this chunk");
            }
        }
    }
    drop(stream);

    let result = recognizer.final_result();
    Ok(result.single().and_then(|single| extract_text(single.text)))
}

/// Extract text from Vosk result, filtering empty results
fn extract_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
