//! Question payloads sent by the practice server

use super::Mode;
use serde::{Deserialize, Serialize};

/// Per-mode prompt payload. The server does not tag questions, so the shape
/// is recognised by its fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Question {
    Phonological {
        question: String,
        choices: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        answer: Option<String>,
    },
    RapidNaming {
        image: String,
        category: String,
        difficulty: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        answer: Option<String>,
    },
    Surface {
        word: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        difficulty: Option<String>,
    },
}

impl Question {
    /// The mode whose panel can display this question
    pub fn mode(&self) -> Mode {
        match self {
            Question::Phonological { .. } => Mode::Phonological,
            Question::Surface { .. } => Mode::Surface,
            Question::RapidNaming { .. } => Mode::RapidNaming,
        }
    }
}

/// Question difficulty as labelled by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Case-insensitive; anything unrecognised counts as easy
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "medium" => Difficulty::Medium,
            "hard" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }

    /// Seconds allowed to name an image of this difficulty
    pub fn countdown_secs(self) -> u64 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phonological_shape() {
        let q: Question = serde_json::from_str(
            r#"{"question": "Which spelling matches 'cat'?", "choices": ["kat", "cat", "cot"], "answer": "cat"}"#,
        )
        .expect("parse");
        assert_eq!(q.mode(), Mode::Phonological);
    }

    #[test]
    fn test_surface_shape() {
        let q: Question =
            serde_json::from_str(r#"{"word": "yacht", "difficulty": "Hard"}"#).expect("parse");
        assert_eq!(
            q,
            Question::Surface {
                word: "yacht".to_string(),
                difficulty: Some("Hard".to_string()),
            }
        );
    }

    #[test]
    fn test_rapid_naming_shape() {
        let q: Question = serde_json::from_str(
            r#"{"image": "/static/img/dog.png", "category": "animals", "difficulty": "Medium", "answer": "dog"}"#,
        )
        .expect("parse");
        assert_eq!(q.mode(), Mode::RapidNaming);
    }

    #[test]
    fn test_unknown_shape_is_rejected() {
        let parsed: Result<Question, _> = serde_json::from_str(r#"{"colour": "red"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_difficulty_mapping() {
        assert_eq!(Difficulty::from_label("easy").countdown_secs(), 5);
        assert_eq!(Difficulty::from_label("Medium").countdown_secs(), 10);
        assert_eq!(Difficulty::from_label("MEDIUM").countdown_secs(), 10);
        assert_eq!(Difficulty::from_label("hard").countdown_secs(), 15);
        assert_eq!(Difficulty::from_label("HaRd").countdown_secs(), 15);
        assert_eq!(Difficulty::from_label("expert").countdown_secs(), 5);
        assert_eq!(Difficulty::from_label("").countdown_secs(), 5);
    }
}
