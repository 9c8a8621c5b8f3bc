//! LexiTalk Error Types
//!
//! Every failure in this crate is recoverable. Callers convert these into a
//! conversational apology or a log line, never into a fatal exit.

use thiserror::Error;

/// Central error type for LexiTalk
#[derive(Error, Debug)]
pub enum PracticeError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected server payload: {0}")]
    Payload(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for LexiTalk operations
pub type PracticeResult<T> = Result<T, PracticeError>;
