//! Conversation log shown during practice

use chrono::{DateTime, Local};

/// Apology after a failed `/select_mode`
pub const MODE_SELECT_APOLOGY: &str =
    "Sorry, there was an error selecting the mode. Please try again.";
/// Apology after a failed `/process_response`
pub const RESPONSE_APOLOGY: &str =
    "Sorry, there was an error processing your response. Please try again.";
/// Apology after a dictation error
pub const HEARING_APOLOGY: &str = "I couldn't hear that. Could you try again?";
/// Appended when a rapid naming countdown runs out
pub const TIMES_UP: &str = "Time's up! What's your answer?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Local>,
}

/// Append-only list of utterances. Only `clear` removes entries.
#[derive(Debug, Clone, Default)]
pub struct ConversationLog {
    entries: Vec<LogEntry>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.entries.push(LogEntry {
            speaker,
            text: text.into(),
            at: Local::now(),
        });
    }

    pub fn user(&mut self, text: impl Into<String>) {
        self.push(Speaker::User, text);
    }

    pub fn assistant(&mut self, text: impl Into<String>) {
        self.push(Speaker::Assistant, text);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// How many entries have exactly this text
    pub fn count_of(&self, text: &str) -> usize {
        self.entries.iter().filter(|e| e.text == text).count()
    }
}
