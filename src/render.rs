//! Question Renderer
//!
//! Turns a question payload into the panel for the active mode. Rapid naming
//! questions also (re)start the countdown.

use crate::session::{Difficulty, Mode, Question};
use crate::timer::Countdown;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The mode-specific part of the practice screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Hidden,
    /// Phonological: a prompt and clickable spellings
    Choices { prompt: String, choices: Vec<String> },
    /// Surface: the word to pronounce
    Word { word: String },
    /// Rapid naming: an image with its category as accessible label
    Image { src: String, alt: String },
}

impl Panel {
    /// Mode whose panel this is, if any is showing
    pub fn mode(&self) -> Option<Mode> {
        match self {
            Panel::Hidden => None,
            Panel::Choices { .. } => Some(Mode::Phonological),
            Panel::Word { .. } => Some(Mode::Surface),
            Panel::Image { .. } => Some(Mode::RapidNaming),
        }
    }

    pub fn is_visible(&self, mode: Mode) -> bool {
        self.mode() == Some(mode)
    }

    pub fn choice(&self, index: usize) -> Option<&str> {
        match self {
            Panel::Choices { choices, .. } => choices.get(index).map(String::as_str),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// Rendered, and the countdown with this generation needs a ticker
    TimerStarted(u64),
    /// Question shape does not belong to the mode; nothing changed
    Rejected,
}

#[derive(Debug, Default)]
pub struct QuestionRenderer {
    panel: Panel,
    countdown: Countdown,
}

impl QuestionRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, question: &Question, mode: Mode, now: Instant) -> RenderOutcome {
        if question.mode() != mode {
            warn!(
                "❓ Ignoring {:?} question while in {:?} mode",
                question.mode(),
                mode
            );
            return RenderOutcome::Rejected;
        }

        match question {
            Question::Phonological {
                question, choices, ..
            } => {
                self.panel = Panel::Choices {
                    prompt: question.clone(),
                    choices: choices.clone(),
                };
                RenderOutcome::Rendered
            }
            Question::Surface { word, .. } => {
                self.panel = Panel::Word { word: word.clone() };
                RenderOutcome::Rendered
            }
            Question::RapidNaming {
                image,
                category,
                difficulty,
                ..
            } => {
                self.panel = Panel::Image {
                    src: image.clone(),
                    alt: category.clone(),
                };
                let seconds = Difficulty::from_label(difficulty).countdown_secs();
                debug!("🖼️ Naming '{}' with {}s on the clock", category, seconds);
                RenderOutcome::TimerStarted(self.countdown.start(seconds, now))
            }
        }
    }

    /// Hide the panel and cancel the countdown. Returns true if a countdown
    /// was running.
    pub fn clear(&mut self) -> bool {
        self.panel = Panel::Hidden;
        self.countdown.cancel()
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn countdown_mut(&mut self) -> &mut Countdown {
        &mut self.countdown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phonological() -> Question {
        Question::Phonological {
            question: "Which spelling matches 'fish'?".to_string(),
            choices: vec!["fish".to_string(), "phish".to_string(), "fich".to_string()],
            answer: None,
        }
    }

    fn surface() -> Question {
        Question::Surface {
            word: "colonel".to_string(),
            difficulty: None,
        }
    }

    fn rapid(difficulty: &str) -> Question {
        Question::RapidNaming {
            image: "/static/img/apple.png".to_string(),
            category: "fruit".to_string(),
            difficulty: difficulty.to_string(),
            answer: None,
        }
    }

    #[test]
    fn test_exactly_one_panel_visible() {
        let now = Instant::now();
        for (question, mode) in [
            (phonological(), Mode::Phonological),
            (surface(), Mode::Surface),
            (rapid("easy"), Mode::RapidNaming),
        ] {
            let mut renderer = QuestionRenderer::new();
            assert_ne!(renderer.render(&question, mode, now), RenderOutcome::Rejected);
            for other in Mode::ALL {
                assert_eq!(renderer.panel().is_visible(other), other == mode);
            }
        }
    }

    #[test]
    fn test_mismatched_shape_is_ignored() {
        let now = Instant::now();
        let mut renderer = QuestionRenderer::new();
        renderer.render(&surface(), Mode::Surface, now);

        assert_eq!(
            renderer.render(&phonological(), Mode::Surface, now),
            RenderOutcome::Rejected
        );
        assert_eq!(
            renderer.panel(),
            &Panel::Word {
                word: "colonel".to_string()
            }
        );
    }

    #[test]
    fn test_choices_are_rebuilt() {
        let now = Instant::now();
        let mut renderer = QuestionRenderer::new();
        renderer.render(&phonological(), Mode::Phonological, now);
        assert_eq!(renderer.panel().choice(1), Some("phish"));
        assert_eq!(renderer.panel().choice(3), None);

        let next = Question::Phonological {
            question: "Which spelling matches 'boat'?".to_string(),
            choices: vec!["bote".to_string(), "boat".to_string()],
            answer: None,
        };
        renderer.render(&next, Mode::Phonological, now);
        assert_eq!(renderer.panel().choice(0), Some("bote"));
        assert_eq!(renderer.panel().choice(2), None);
    }

    #[test]
    fn test_rapid_naming_starts_countdown() {
        let now = Instant::now();
        let mut renderer = QuestionRenderer::new();

        for (label, secs) in [("Easy", 5), ("medium", 10), ("HARD", 15), ("weird", 5)] {
            let outcome = renderer.render(&rapid(label), Mode::RapidNaming, now);
            assert!(matches!(outcome, RenderOutcome::TimerStarted(_)));
            assert_eq!(renderer.countdown().display(), secs.to_string());
        }
        assert_eq!(
            renderer.panel(),
            &Panel::Image {
                src: "/static/img/apple.png".to_string(),
                alt: "fruit".to_string(),
            }
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let now = Instant::now();
        let mut renderer = QuestionRenderer::new();
        let question = rapid("medium");

        let first = renderer.render(&question, Mode::RapidNaming, now);
        let panel = renderer.panel().clone();
        let second = renderer.render(&question, Mode::RapidNaming, now);

        assert_eq!(renderer.panel(), &panel);
        let (RenderOutcome::TimerStarted(a), RenderOutcome::TimerStarted(b)) = (first, second)
        else {
            panic!("expected timers");
        };
        // Restarted, not stacked: only the newest generation is live
        assert!(b > a);
        assert_eq!(renderer.countdown().generation(), b);
        assert!(renderer.countdown().is_active());
    }

    #[test]
    fn test_clear_cancels_countdown() {
        let now = Instant::now();
        let mut renderer = QuestionRenderer::new();
        renderer.render(&rapid("hard"), Mode::RapidNaming, now);
        assert!(renderer.clear());
        assert_eq!(renderer.panel(), &Panel::Hidden);
        assert!(!renderer.countdown().is_active());
    }
}
