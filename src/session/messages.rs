//! Message types for the session controller
//!
//! `Event`s flow into [`Controller::update`](super::Controller::update);
//! `Effect`s flow out and are executed by the runtime.

use super::Mode;
use crate::capture::DictationEvent;
use crate::client::{FinishReply, FinishRequest, ModeReply, ResponseReply};
use crate::error::PracticeResult;

/// Inputs that drive the controller
#[derive(Debug)]
pub enum Event {
    // Mode selection screen
    ModeChosen(Mode),

    // Practice screen
    InputChanged(String),
    SendPressed,
    ChoicePicked(usize),
    MicPressed,
    RecordPressed,

    // Any screen
    RestartPressed,
    Quit,

    // Server replies, tagged with the epoch they were requested under
    ModeLoaded {
        epoch: u64,
        mode: Mode,
        result: PracticeResult<ModeReply>,
    },
    ResponseProcessed {
        epoch: u64,
        result: PracticeResult<ResponseReply>,
    },
    SessionFinished {
        epoch: u64,
        result: PracticeResult<FinishReply>,
    },

    // Countdown ticker
    TimerTick { generation: u64 },

    // Dictation capability
    Dictation(DictationEvent),
}

/// Side effects requested by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SelectMode { epoch: u64, mode: Mode },
    ProcessResponse { epoch: u64, text: String },
    Finish { epoch: u64, request: FinishRequest },
    PlayAudio(String),
    StartTicker { generation: u64 },
    StopTicker,
    StartDictation,
    StopDictation,
    Exit,
}
