//! Practice session state
//!
//! The mode, question and score bookkeeping for one practice run, plus the
//! controller that drives it.

pub mod controller;
pub mod log;
pub mod messages;
pub mod question;

use serde::{Deserialize, Serialize};

pub use controller::{Controller, ResultsView};
pub use log::{ConversationLog, LogEntry, Speaker};
pub use messages::{Effect, Event};
pub use question::{Difficulty, Question};

/// Practice exercise type. Serialized with the server's numeric tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "1")]
    Phonological,
    #[serde(rename = "2")]
    Surface,
    #[serde(rename = "3")]
    RapidNaming,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Phonological, Mode::Surface, Mode::RapidNaming];

    /// Wire tag used in form bodies
    pub fn tag(self) -> &'static str {
        match self {
            Mode::Phonological => "1",
            Mode::Surface => "2",
            Mode::RapidNaming => "3",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim() {
            "1" => Some(Mode::Phonological),
            "2" => Some(Mode::Surface),
            "3" => Some(Mode::RapidNaming),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Phonological => "Phonological Dyslexia",
            Mode::Surface => "Surface Dyslexia",
            Mode::RapidNaming => "Rapid Naming",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Which top-level screen is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    ModeSelection,
    Practice,
    Results,
}

impl Screen {
    /// Whether `self -> to` is a legal screen change
    pub fn can_transition(self, to: Screen) -> bool {
        matches!(
            (self, to),
            (Screen::ModeSelection, Screen::Practice)
                | (Screen::Practice, Screen::Results)
                | (_, Screen::ModeSelection)
        )
    }
}

/// Bookkeeping for one practice run. Cleared as a whole, never field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub mode: Option<Mode>,
    pub question: Option<Question>,
    pub score: u32,
    pub completed: u32,
}

impl Session {
    pub fn is_active(&self) -> bool {
        self.mode.is_some()
    }
}
