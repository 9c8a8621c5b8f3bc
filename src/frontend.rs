//! Terminal front-end
//!
//! Prints what changed on the controller after each event and maps typed
//! lines to UI events.

use crate::render::Panel;
use crate::runtime::Presenter;
use crate::session::{Controller, Event, Mode, Screen, Speaker};
use std::io::Write;

pub const HELP: &str = "Commands: /1 /2 /3 choose a mode, /pick N choose an option, \
/mic toggle the microphone, /record record a pronunciation, /restart, /quit. \
Anything else is sent as your answer.";

/// Turn one typed line into UI events. `None` means an unknown command.
pub fn parse_line(line: &str) -> Option<Vec<Event>> {
    let line = line.trim();
    if line.is_empty() {
        return Some(Vec::new());
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(vec![Event::InputChanged(line.to_string()), Event::SendPressed]);
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    let event = match (name.as_str(), arg) {
        (tag @ ("1" | "2" | "3"), None) => Event::ModeChosen(Mode::from_tag(tag)?),
        ("mode", Some(tag)) => Event::ModeChosen(Mode::from_tag(tag)?),
        ("pick", Some(n)) => {
            let n: usize = n.parse().ok()?;
            Event::ChoicePicked(n.checked_sub(1)?)
        }
        ("mic", None) => Event::MicPressed,
        ("record", None) => Event::RecordPressed,
        ("send", None) => Event::SendPressed,
        ("restart", None) => Event::RestartPressed,
        ("quit" | "exit", None) => Event::Quit,
        _ => return None,
    };
    Some(vec![event])
}

/// Writes changes to any `Write`, usually stdout
pub struct TerminalPresenter<W: Write + Send> {
    out: W,
    screen: Option<Screen>,
    printed: usize,
    epoch: u64,
    panel: Panel,
    countdown: String,
    listening: bool,
    held: bool,
    closing_shown: bool,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            screen: None,
            printed: 0,
            epoch: 0,
            panel: Panel::Hidden,
            countdown: String::new(),
            listening: false,
            held: false,
            closing_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, c: &Controller) -> std::io::Result<()> {
        if self.screen != Some(c.screen()) || self.epoch != c.epoch() {
            self.screen = Some(c.screen());
            self.epoch = c.epoch();
            self.panel = Panel::Hidden;
            self.countdown.clear();
            self.closing_shown = false;
            self.draw_screen(c)?;
        }

        if c.log().len() < self.printed {
            self.printed = 0;
        }
        for entry in &c.log().entries()[self.printed..] {
            let who = match entry.speaker {
                Speaker::User => "🧑 You",
                Speaker::Assistant => "🤖 Tutor",
            };
            writeln!(self.out, "[{}] {}: {}", entry.at.format("%H:%M:%S"), who, entry.text)?;
        }
        self.printed = c.log().len();

        if c.screen() == Screen::Practice {
            self.draw_practice(c)?;
        }

        if let Some(closing) = c.results().and_then(|r| r.closing.as_deref()) {
            if !self.closing_shown {
                writeln!(self.out, "{}", closing)?;
                self.closing_shown = true;
            }
        }

        self.out.flush()
    }

    fn draw_screen(&mut self, c: &Controller) -> std::io::Result<()> {
        match c.screen() {
            Screen::ModeSelection => {
                writeln!(self.out, "\nChoose a practice mode:")?;
                for mode in Mode::ALL {
                    writeln!(self.out, "  /{}  {}", mode.tag(), mode)?;
                }
            }
            Screen::Practice => {
                writeln!(self.out, "\n== Practice == (/restart to start over)")?;
                if c.mic_icon().is_some() {
                    writeln!(self.out, "  /mic to answer by voice")?;
                }
            }
            Screen::Results => {
                if let Some(results) = c.results() {
                    writeln!(self.out, "\n== Results ==")?;
                    writeln!(self.out, "  Score: {}", results.score)?;
                    writeln!(self.out, "  Questions completed: {}", results.completed)?;
                    writeln!(self.out, "  {}", results.feedback())?;
                    writeln!(self.out, "  /restart to practice again")?;
                }
            }
        }
        Ok(())
    }

    fn draw_practice(&mut self, c: &Controller) -> std::io::Result<()> {
        if c.panel() != &self.panel {
            self.panel = c.panel().clone();
            match c.panel() {
                Panel::Hidden => {}
                Panel::Choices { prompt, choices } => {
                    writeln!(self.out, "❓ {}", prompt)?;
                    for (i, choice) in choices.iter().enumerate() {
                        writeln!(self.out, "  /pick {}  {}", i + 1, choice)?;
                    }
                }
                Panel::Word { word } => {
                    writeln!(self.out, "🔤 Say this word: {}", word)?;
                    if c.record_enabled() {
                        writeln!(self.out, "  /record  {}", c.record_label())?;
                    }
                }
                Panel::Image { src, alt } => {
                    writeln!(self.out, "🖼️ Name this {}: {}", alt, src)?;
                }
            }
        }

        if matches!(c.panel(), Panel::Image { .. }) && c.countdown_display() != self.countdown {
            self.countdown = c.countdown_display().to_string();
            writeln!(self.out, "⏱️ {}", self.countdown)?;
        }

        if c.is_listening() != self.listening {
            self.listening = c.is_listening();
            if self.listening {
                writeln!(self.out, "🎙️ {}", crate::capture::RECORD_LISTENING_LABEL)?;
            } else if let Some(icon) = c.mic_icon() {
                writeln!(self.out, "{} Stopped listening", icon.glyph())?;
            }
        }

        if c.answer_held() != self.held {
            self.held = c.answer_held();
            if self.held {
                writeln!(
                    self.out,
                    "⏳ The tutor is still replying. /send to submit \"{}\" again",
                    c.input()
                )?;
            }
        }
        Ok(())
    }
}

impl<W: Write + Send> Presenter for TerminalPresenter<W> {
    fn present(&mut self, controller: &Controller) {
        if let Err(e) = self.draw(controller) {
            tracing::warn!("Could not write to terminal: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ModeReply;
    use crate::session::Question;

    #[test]
    fn test_parse_mode_commands() {
        assert!(matches!(
            parse_line("/1").as_deref(),
            Some([Event::ModeChosen(Mode::Phonological)])
        ));
        assert!(matches!(
            parse_line("/mode 3").as_deref(),
            Some([Event::ModeChosen(Mode::RapidNaming)])
        ));
        assert!(parse_line("/mode 9").is_none());
    }

    #[test]
    fn test_parse_controls() {
        assert!(matches!(parse_line("/mic").as_deref(), Some([Event::MicPressed])));
        assert!(matches!(parse_line("/RECORD").as_deref(), Some([Event::RecordPressed])));
        assert!(matches!(parse_line("/restart").as_deref(), Some([Event::RestartPressed])));
        assert!(matches!(parse_line("/exit").as_deref(), Some([Event::Quit])));
        assert!(matches!(parse_line("/pick 2").as_deref(), Some([Event::ChoicePicked(1)])));
        assert!(parse_line("/pick 0").is_none());
        assert!(parse_line("/pick two").is_none());
        assert!(parse_line("/dance").is_none());
    }

    #[test]
    fn test_parse_free_text() {
        let events = parse_line("  the cat  ").expect("events");
        assert!(matches!(
            events.as_slice(),
            [Event::InputChanged(text), Event::SendPressed] if text == "the cat"
        ));
        assert!(parse_line("   ").expect("events").is_empty());
    }

    #[test]
    fn test_presenter_prints_changes_once() {
        let mut c = Controller::new(false);
        let mut presenter = TerminalPresenter::new(Vec::new());
        presenter.present(&c);

        c.select_mode(Mode::Phonological);
        c.update(Event::ModeLoaded {
            epoch: c.epoch(),
            mode: Mode::Phonological,
            result: Ok(ModeReply {
                greeting: "Welcome to Phonological Dyslexia practice.".to_string(),
                speech_url: String::new(),
                question: Some(Question::Phonological {
                    question: "Which spelling matches 'rain'?".to_string(),
                    choices: vec!["rane".to_string(), "rain".to_string()],
                    answer: None,
                }),
            }),
        });
        presenter.present(&c);
        presenter.present(&c);

        let text = String::from_utf8(presenter.into_inner()).expect("utf8");
        assert!(!text.contains("still replying"));
        assert!(text.contains("Choose a practice mode"));
        assert!(text.contains("/3  Rapid Naming"));
        assert_eq!(text.matches("Welcome to Phonological").count(), 1);
        assert!(text.contains("/pick 2  rain"));
    }

    #[test]
    fn test_presenter_reports_held_answer() {
        let mut c = Controller::new(false);
        let mut presenter = TerminalPresenter::new(Vec::new());
        c.select_mode(Mode::Surface);
        c.update(Event::ModeLoaded {
            epoch: c.epoch(),
            mode: Mode::Surface,
            result: Ok(ModeReply {
                greeting: "Say each word aloud.".to_string(),
                speech_url: String::new(),
                question: Some(Question::Surface {
                    word: "yacht".to_string(),
                    difficulty: None,
                }),
            }),
        });
        c.submit_response("yot");
        c.update(Event::InputChanged("yacht".to_string()));
        c.update(Event::SendPressed);
        presenter.present(&c);
        presenter.present(&c);

        let text = String::from_utf8(presenter.into_inner()).expect("utf8");
        assert_eq!(
            text.matches("still replying. /send to submit \"yacht\" again").count(),
            1
        );
    }
}
