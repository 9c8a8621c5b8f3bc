//! Session Controller
//!
//! Owns the screen, the session, the conversation log and the controls. All
//! inputs arrive as [`Event`]s; anything that touches the outside world is
//! returned as an [`Effect`] for the runtime to carry out.

use super::log::{HEARING_APOLOGY, MODE_SELECT_APOLOGY, RESPONSE_APOLOGY, TIMES_UP};
use super::{ConversationLog, Effect, Event, Mode, Screen, Session};
use crate::capture::{CaptureAction, Completion, DictationEvent, MicIcon, SpeechCapture};
use crate::client::{FinishReply, FinishRequest, ModeReply, ResponseReply};
use crate::error::PracticeResult;
use crate::render::{Panel, QuestionRenderer, RenderOutcome};
use crate::timer::Tick;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Points the server awards for a perfect answer. Must match its scoring.
pub const MAX_POINTS_PER_QUESTION: u32 = 3;

/// Feedback shown on the results screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTier {
    Excellent,
    Progressing,
    Encouragement,
}

impl FeedbackTier {
    /// `>= 80%` of the maximum is excellent, `>= 60%` is progressing
    pub fn from_score(score: u32, question_count: u32) -> Self {
        if question_count == 0 {
            return FeedbackTier::Encouragement;
        }
        let earned = u64::from(score) * 5;
        let max = u64::from(question_count) * u64::from(MAX_POINTS_PER_QUESTION);
        if earned >= max * 4 {
            FeedbackTier::Excellent
        } else if earned >= max * 3 {
            FeedbackTier::Progressing
        } else {
            FeedbackTier::Encouragement
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Great job! You showed excellent skills in this practice.",
            FeedbackTier::Progressing => {
                "Good work! You're making solid progress with your skills."
            }
            FeedbackTier::Encouragement => {
                "Keep practicing! Everyone improves with regular practice."
            }
        }
    }
}

/// What the results screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub score: u32,
    pub completed: u32,
    pub tier: FeedbackTier,
    /// Closing line from `/finish`, once it arrives
    pub closing: Option<String>,
}

impl ResultsView {
    pub fn feedback(&self) -> &'static str {
        self.tier.message()
    }
}

#[derive(Debug)]
pub struct Controller {
    screen: Screen,
    session: Session,
    log: ConversationLog,
    input: String,
    renderer: QuestionRenderer,
    /// `None` when the platform has no dictation
    capture: Option<SpeechCapture>,
    results: Option<ResultsView>,
    epoch: u64,
    awaiting_reply: bool,
    /// An answer was refused by the in-flight guard and sits in the input
    answer_held: bool,
}

impl Controller {
    pub fn new(dictation_available: bool) -> Self {
        Self {
            screen: Screen::ModeSelection,
            session: Session::default(),
            log: ConversationLog::new(),
            input: String::new(),
            renderer: QuestionRenderer::new(),
            capture: dictation_available.then(SpeechCapture::new),
            results: None,
            epoch: 0,
            awaiting_reply: false,
            answer_held: false,
        }
    }

    /// Apply one event and return the effects it requires
    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::ModeChosen(mode) => self.select_mode(mode),
            Event::InputChanged(text) => {
                if self.screen == Screen::Practice {
                    self.input = text;
                    self.answer_held = false;
                }
                Vec::new()
            }
            Event::SendPressed => {
                let text = self.input.clone();
                self.submit_response(&text)
            }
            Event::ChoicePicked(index) => self.pick_choice(index),
            Event::MicPressed => self.press_mic(),
            Event::RecordPressed => self.press_record(),
            Event::RestartPressed => self.reset(),
            Event::Quit => {
                let mut effects = self.reset();
                effects.push(Effect::Exit);
                effects
            }
            Event::ModeLoaded {
                epoch,
                mode,
                result,
            } => {
                if self.is_stale(epoch, "select_mode") {
                    return Vec::new();
                }
                self.on_mode_loaded(mode, result)
            }
            Event::ResponseProcessed { epoch, result } => {
                if self.is_stale(epoch, "process_response") {
                    return Vec::new();
                }
                self.awaiting_reply = false;
                self.on_response(result)
            }
            Event::SessionFinished { epoch, result } => {
                if self.is_stale(epoch, "finish") {
                    return Vec::new();
                }
                self.on_finished(result)
            }
            Event::TimerTick { generation } => self.on_tick(generation),
            Event::Dictation(event) => self.on_dictation(event),
        }
    }

    /// Start a practice run in `mode`. Only valid from mode selection.
    pub fn select_mode(&mut self, mode: Mode) -> Vec<Effect> {
        if self.screen != Screen::ModeSelection {
            debug!("Ignoring mode selection on {:?} screen", self.screen);
            return Vec::new();
        }

        info!("📚 Mode selected: {}", mode);
        self.log.clear();
        self.session = Session::default();
        self.epoch += 1;
        self.transition(Screen::Practice);
        vec![Effect::SelectMode {
            epoch: self.epoch,
            mode,
        }]
    }

    /// Send the user's answer. Blank text is a no-op.
    pub fn submit_response(&mut self, text: &str) -> Vec<Effect> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if self.screen != Screen::Practice {
            debug!("Ignoring submission on {:?} screen", self.screen);
            return Vec::new();
        }
        if self.awaiting_reply {
            info!("⏳ Reply still pending, '{}' kept in the input to resend", text);
            self.answer_held = true;
            return Vec::new();
        }

        self.log.user(text);
        self.input.clear();
        self.awaiting_reply = true;
        self.answer_held = false;
        vec![Effect::ProcessResponse {
            epoch: self.epoch,
            text: text.to_string(),
        }]
    }

    /// Show results and ask the server for a closing message
    pub fn finish_session(&mut self, score: u32, question_count: u32) -> Vec<Effect> {
        let mut effects = self.stop_activity();
        self.session.score = score;
        self.session.completed = question_count;

        if !self.transition(Screen::Results) {
            return effects;
        }

        let tier = FeedbackTier::from_score(score, question_count);
        info!(
            "🏁 Finished with {} points over {} questions ({:?})",
            score, question_count, tier
        );
        self.results = Some(ResultsView {
            score,
            completed: question_count,
            tier,
            closing: None,
        });

        match self.session.mode {
            Some(mode) => effects.push(Effect::Finish {
                epoch: self.epoch,
                request: FinishRequest {
                    mode,
                    score,
                    question_count,
                },
            }),
            None => warn!("⚠️ Finished without an active mode; skipping /finish"),
        }
        effects
    }

    /// Return to mode selection with nothing left running
    pub fn reset(&mut self) -> Vec<Effect> {
        let effects = self.stop_activity();
        self.renderer.clear();
        self.session = Session::default();
        self.log.clear();
        self.input.clear();
        self.results = None;
        self.awaiting_reply = false;
        self.answer_held = false;
        self.epoch += 1;
        self.transition(Screen::ModeSelection);
        debug!("🔄 Session reset");
        effects
    }

    fn pick_choice(&mut self, index: usize) -> Vec<Effect> {
        let Some(choice) = self.renderer.panel().choice(index) else {
            debug!("No choice #{} on the current panel", index);
            return Vec::new();
        };
        let choice = choice.to_string();
        self.input = choice.clone();
        self.submit_response(&choice)
    }

    fn press_mic(&mut self) -> Vec<Effect> {
        if self.screen != Screen::Practice {
            return Vec::new();
        }
        let Some(capture) = self.capture.as_mut() else {
            return Vec::new();
        };
        match capture.press_toggle() {
            CaptureAction::Start => vec![Effect::StartDictation],
            CaptureAction::Stop => vec![Effect::StopDictation],
            CaptureAction::Ignored => Vec::new(),
        }
    }

    fn press_record(&mut self) -> Vec<Effect> {
        if !self.renderer.panel().is_visible(Mode::Surface) {
            return Vec::new();
        }
        let Some(capture) = self.capture.as_mut() else {
            return Vec::new();
        };
        match capture.press_one_shot() {
            CaptureAction::Start => vec![Effect::StartDictation],
            _ => Vec::new(),
        }
    }

    fn on_mode_loaded(&mut self, mode: Mode, result: PracticeResult<ModeReply>) -> Vec<Effect> {
        match result {
            Ok(reply) => {
                let mut effects = Vec::new();
                self.log.assistant(reply.greeting);
                push_audio(&mut effects, reply.speech_url);
                self.session.mode = Some(mode);
                self.session.question = reply.question;
                effects.extend(self.render_current());
                effects
            }
            Err(e) => {
                warn!("❌ Error selecting mode: {}", e);
                self.log.assistant(MODE_SELECT_APOLOGY);
                Vec::new()
            }
        }
    }

    fn on_response(&mut self, result: PracticeResult<ResponseReply>) -> Vec<Effect> {
        match result {
            Ok(reply) => {
                let mut effects = Vec::new();
                self.log.assistant(reply.response);
                push_audio(&mut effects, reply.speech_url);

                if let Some(question) = reply.next_question {
                    self.session.question = Some(question);
                    self.session.completed += 1;
                    effects.extend(self.render_current());
                }
                if reply.end_of_mode {
                    effects.extend(self.finish_session(
                        reply.score.unwrap_or(0),
                        reply.question_count.unwrap_or(0),
                    ));
                }
                effects
            }
            Err(e) => {
                warn!("❌ Error processing response: {}", e);
                self.log.assistant(RESPONSE_APOLOGY);
                Vec::new()
            }
        }
    }

    fn on_finished(&mut self, result: PracticeResult<FinishReply>) -> Vec<Effect> {
        match result {
            Ok(reply) => {
                let mut effects = Vec::new();
                push_audio(&mut effects, reply.speech_url);
                if let Some(results) = self.results.as_mut() {
                    results.closing = reply.message;
                }
                effects
            }
            Err(e) => {
                warn!("❌ Error finishing session: {}", e);
                Vec::new()
            }
        }
    }

    fn on_tick(&mut self, generation: u64) -> Vec<Effect> {
        match self
            .renderer
            .countdown_mut()
            .tick(generation, Instant::now())
        {
            Tick::Expired => {
                self.log.assistant(TIMES_UP);
                vec![Effect::StopTicker]
            }
            Tick::Remaining(_) | Tick::Ignored => Vec::new(),
        }
    }

    fn on_dictation(&mut self, event: DictationEvent) -> Vec<Effect> {
        let Some(capture) = self.capture.as_mut() else {
            return Vec::new();
        };
        match event {
            DictationEvent::Transcript(text) => {
                if capture.on_transcript() {
                    self.input = text.trim().to_string();
                    self.answer_held = false;
                } else {
                    debug!("Dropping transcript from a stopped capture: '{}'", text);
                }
                Vec::new()
            }
            DictationEvent::Error(code) => {
                warn!("Speech recognition error: {}", code);
                if capture.on_error() {
                    self.log.assistant(HEARING_APOLOGY);
                }
                Vec::new()
            }
            DictationEvent::End => match capture.on_end() {
                Completion::OneShotCompleted => {
                    let text = self.input.clone();
                    self.submit_response(&text)
                }
                Completion::ToggleEnded | Completion::OneShotCancelled | Completion::None => {
                    Vec::new()
                }
            },
        }
    }

    fn render_current(&mut self) -> Vec<Effect> {
        let (Some(mode), Some(question)) = (self.session.mode, self.session.question.as_ref())
        else {
            return Vec::new();
        };
        match self.renderer.render(question, mode, Instant::now()) {
            RenderOutcome::TimerStarted(generation) => vec![Effect::StartTicker { generation }],
            RenderOutcome::Rendered | RenderOutcome::Rejected => Vec::new(),
        }
    }

    /// Cancel the countdown and any capture
    fn stop_activity(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.renderer.countdown_mut().cancel() {
            effects.push(Effect::StopTicker);
        }
        if let Some(capture) = self.capture.as_mut() {
            if capture.cancel() {
                effects.push(Effect::StopDictation);
            }
        }
        effects
    }

    /// The only place the screen changes
    fn transition(&mut self, to: Screen) -> bool {
        if self.screen == to {
            return true;
        }
        if !self.screen.can_transition(to) {
            warn!("⚠️ Refusing screen change {:?} -> {:?}", self.screen, to);
            return false;
        }
        debug!("🧭 Screen {:?} -> {:?}", self.screen, to);
        self.screen = to;
        true
    }

    fn is_stale(&self, epoch: u64, endpoint: &str) -> bool {
        if epoch != self.epoch {
            debug!("Dropping stale {} reply (epoch {} != {})", endpoint, epoch, self.epoch);
            true
        } else {
            false
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Conversation so far, oldest first
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Current contents of the answer box
    pub fn input(&self) -> &str {
        &self.input
    }

    /// True when the last submission was refused because a reply was still
    /// pending. The answer is left in [`input`](Self::input).
    pub fn answer_held(&self) -> bool {
        self.answer_held
    }

    pub fn panel(&self) -> &Panel {
        self.renderer.panel()
    }

    /// Remaining-time display of the rapid naming panel
    pub fn countdown_display(&self) -> &str {
        self.renderer.countdown().display()
    }

    pub fn countdown_active(&self) -> bool {
        self.renderer.countdown().is_active()
    }

    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    /// A `/process_response` request is outstanding
    pub fn is_awaiting_reply(&self) -> bool {
        self.awaiting_reply
    }

    /// Bumped on every mode selection and reset
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `None` means the mic control is hidden
    pub fn mic_icon(&self) -> Option<MicIcon> {
        self.capture.as_ref().map(SpeechCapture::mic_icon)
    }

    pub fn is_listening(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(SpeechCapture::is_listening)
    }

    /// Whether `/record` would be accepted by the recorder itself
    pub fn record_enabled(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(SpeechCapture::record_enabled)
    }

    pub fn record_label(&self) -> &'static str {
        self.capture
            .as_ref()
            .map(SpeechCapture::record_label)
            .unwrap_or(crate::capture::RECORD_LABEL)
    }
}

fn push_audio(effects: &mut Vec<Effect>, speech_url: String) {
    if !speech_url.is_empty() {
        effects.push(Effect::PlayAudio(speech_url));
    }
}
