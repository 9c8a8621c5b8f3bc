//! Speech Capture
//!
//! Wraps a dictation capability with two trigger surfaces: the mic toggle and
//! the one-shot pronunciation recorder. Both share one [`Dictation`] and at
//! most one of them owns it at any moment.

#[cfg(feature = "dictation")]
pub mod vosk;

use crate::config::Config;
use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Label of the record control while idle
pub const RECORD_LABEL: &str = "Record Pronunciation";
/// Label of the record control while listening
pub const RECORD_LISTENING_LABEL: &str = "Listening...";

/// Events reported by a dictation session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictationEvent {
    /// Final transcript for the session
    Transcript(String),
    /// Platform error code (e.g. "no-speech")
    Error(String),
    /// The session is over. Sent exactly once per started session.
    End,
}

/// Channel a dictation backend reports on
pub type DictationSink = UnboundedSender<DictationEvent>;

/// Trait for dictation backends
///
/// One `start` produces at most one transcript, then exactly one `End`.
pub trait Dictation: Send {
    fn start(&mut self) -> Result<()>;

    /// Ask the current session to finish early. Idempotent.
    fn stop(&mut self);

    fn name(&self) -> &str;
}

/// Detect the dictation capability once at startup
pub fn detect(config: &Config, sink: DictationSink) -> Option<Box<dyn Dictation>> {
    if !config.dictation_enabled {
        info!("🔇 Dictation disabled in config");
        return None;
    }

    #[cfg(feature = "dictation")]
    {
        match vosk::VoskDictation::new(config, sink) {
            Ok(engine) => {
                info!("🎙️ Dictation available: {}", engine.name());
                Some(Box::new(engine))
            }
            Err(e) => {
                tracing::warn!("⚠️ Speech recognition not supported: {}", e);
                None
            }
        }
    }

    #[cfg(not(feature = "dictation"))]
    {
        drop(sink);
        info!("🔇 Speech recognition not supported in this build");
        None
    }
}

/// Which trigger surface owns the capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Toggle,
    OneShot,
}

/// `listening` is only ever true while `owner` is set. An owner that is no
/// longer listening has been stopped and is waiting for the backend's `End`;
/// the capture stays claimed until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureState {
    pub listening: bool,
    pub owner: Option<Trigger>,
}

/// What the caller must do after pressing a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureAction {
    Start,
    Stop,
    Ignored,
}

/// Result of the end-of-session signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Nothing was listening
    None,
    ToggleEnded,
    /// The caller submits the input buffer if it is non-empty
    OneShotCompleted,
    /// A one-shot that was cancelled before it finished
    OneShotCancelled,
}

/// Mic toggle appearance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicIcon {
    Microphone,
    Stop,
}

impl MicIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            MicIcon::Microphone => "🎤",
            MicIcon::Stop => "⏹️",
        }
    }
}

/// Capture state machine shared by both triggers
#[derive(Debug, Clone, Default)]
pub struct SpeechCapture {
    state: CaptureState,
}

impl SpeechCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state.listening
    }

    pub fn press_toggle(&mut self) -> CaptureAction {
        match (self.state.owner, self.state.listening) {
            (None, _) => {
                self.begin(Trigger::Toggle);
                CaptureAction::Start
            }
            (Some(Trigger::Toggle), true) => {
                self.state.listening = false;
                debug!("🎤 Toggle capture stopping");
                CaptureAction::Stop
            }
            (Some(Trigger::Toggle), false) => {
                debug!("🎤 Toggle ignored: previous session still ending");
                CaptureAction::Ignored
            }
            (Some(Trigger::OneShot), _) => {
                debug!("🎤 Toggle ignored: recorder owns the capture");
                CaptureAction::Ignored
            }
        }
    }

    pub fn press_one_shot(&mut self) -> CaptureAction {
        if self.state.owner.is_some() {
            debug!("🎙️ Record ignored: capture in use");
            return CaptureAction::Ignored;
        }
        self.begin(Trigger::OneShot);
        CaptureAction::Start
    }

    /// A transcript arrived. Returns true if it belongs to a live session
    /// and should fill the input buffer. The toggle stops listening on it;
    /// the recorder keeps listening until the end signal.
    pub fn on_transcript(&mut self) -> bool {
        if !self.state.listening {
            return false;
        }
        if self.state.owner == Some(Trigger::Toggle) {
            self.state.listening = false;
        }
        true
    }

    /// A platform error arrived. Returns true if a capture was live and the
    /// user should hear an apology.
    pub fn on_error(&mut self) -> bool {
        if !self.state.listening {
            return false;
        }
        if self.state.owner == Some(Trigger::Toggle) {
            self.state.listening = false;
        }
        true
    }

    /// The backend finished its session. Only this releases the capture.
    pub fn on_end(&mut self) -> Completion {
        let completion = match (self.state.owner, self.state.listening) {
            (Some(Trigger::Toggle), _) => Completion::ToggleEnded,
            (Some(Trigger::OneShot), true) => Completion::OneShotCompleted,
            (Some(Trigger::OneShot), false) => Completion::OneShotCancelled,
            (None, _) => Completion::None,
        };
        self.idle();
        completion
    }

    /// Stop listening. Returns true if the backend must be stopped. The
    /// owner is kept until the backend reports `End`.
    pub fn cancel(&mut self) -> bool {
        let was_listening = self.state.listening;
        self.state.listening = false;
        was_listening
    }

    pub fn mic_icon(&self) -> MicIcon {
        if self.state.owner == Some(Trigger::Toggle) && self.state.listening {
            MicIcon::Stop
        } else {
            MicIcon::Microphone
        }
    }

    pub fn record_enabled(&self) -> bool {
        self.state.owner != Some(Trigger::OneShot)
    }

    pub fn record_label(&self) -> &'static str {
        if self.state.owner == Some(Trigger::OneShot) {
            RECORD_LISTENING_LABEL
        } else {
            RECORD_LABEL
        }
    }

    fn begin(&mut self, owner: Trigger) {
        self.state = CaptureState {
            listening: true,
            owner: Some(owner),
        };
    }

    fn idle(&mut self) {
        self.state = CaptureState::default();
    }
}
