//! Session runtime
//!
//! Single-threaded event loop around the [`Controller`]. UI input, server
//! replies, countdown ticks and dictation events all arrive here and are
//! applied one at a time. Requests and playback run as spawned tasks that
//! post their outcome back as events, so nothing awaits inline.

use crate::audio::AudioPlayer;
use crate::capture::{Dictation, DictationEvent, DictationSink};
use crate::client::PracticeServer;
use crate::session::{Controller, Effect, Event};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Countdown tick resolution
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Something that shows the controller's state to the user
pub trait Presenter: Send {
    fn present(&mut self, controller: &Controller);
}

pub struct Runtime {
    controller: Controller,
    server: Arc<dyn PracticeServer>,
    audio: Arc<dyn AudioPlayer>,
    dictation: Option<Box<dyn Dictation>>,
    events_tx: UnboundedSender<Event>,
    events_rx: UnboundedReceiver<Event>,
    dictation_tx: DictationSink,
    dictation_rx: UnboundedReceiver<DictationEvent>,
    ticker: Option<JoinHandle<()>>,
    presenter: Option<Box<dyn Presenter>>,
}

impl Runtime {
    /// Build a runtime. `detect` is called once with the channel the
    /// dictation backend must report on; `None` means no dictation.
    pub fn new<F>(server: Arc<dyn PracticeServer>, audio: Arc<dyn AudioPlayer>, detect: F) -> Self
    where
        F: FnOnce(DictationSink) -> Option<Box<dyn Dictation>>,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (dictation_tx, dictation_rx) = mpsc::unbounded_channel();
        let dictation = detect(dictation_tx.clone());

        Self {
            controller: Controller::new(dictation.is_some()),
            server,
            audio,
            dictation,
            events_tx,
            events_rx,
            dictation_tx,
            dictation_rx,
            ticker: None,
            presenter: None,
        }
    }

    pub fn with_presenter(mut self, presenter: Box<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Handle for feeding UI events into the loop
    pub fn sender(&self) -> UnboundedSender<Event> {
        self.events_tx.clone()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Run until `Quit` or until every sender is gone
    pub async fn run(mut self) {
        self.present();
        while self.step().await {}
        self.shutdown();
        info!("👋 Session loop stopped");
    }

    /// Wait for the next event and apply it. Returns false once the loop
    /// should stop.
    pub async fn step(&mut self) -> bool {
        let event = tokio::select! {
            Some(event) = self.events_rx.recv() => event,
            Some(event) = self.dictation_rx.recv() => Event::Dictation(event),
            else => return false,
        };
        self.dispatch(event)
    }

    /// Apply one event immediately
    pub fn dispatch(&mut self, event: Event) -> bool {
        debug!("📥 {:?}", event);
        let effects = self.controller.update(event);
        let mut keep_running = true;
        for effect in effects {
            keep_running &= self.execute(effect);
        }
        self.present();
        keep_running
    }

    pub fn present(&mut self) {
        if let Some(presenter) = self.presenter.as_mut() {
            presenter.present(&self.controller);
        }
    }

    fn execute(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::SelectMode { epoch, mode } => {
                let server = self.server.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = server.select_mode(mode).await;
                    let _ = tx.send(Event::ModeLoaded {
                        epoch,
                        mode,
                        result,
                    });
                });
            }
            Effect::ProcessResponse { epoch, text } => {
                let server = self.server.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = server.process_response(&text).await;
                    let _ = tx.send(Event::ResponseProcessed { epoch, result });
                });
            }
            Effect::Finish { epoch, request } => {
                let server = self.server.clone();
                let tx = self.events_tx.clone();
                tokio::spawn(async move {
                    let result = server.finish(&request).await;
                    let _ = tx.send(Event::SessionFinished { epoch, result });
                });
            }
            Effect::PlayAudio(reference) => {
                let url = self.server.media_url(&reference);
                let audio = self.audio.clone();
                tokio::spawn(async move {
                    if let Err(e) = audio.play(&url).await {
                        warn!("🔇 Error playing audio {}: {}", url, e);
                    }
                });
            }
            Effect::StartTicker { generation } => self.start_ticker(generation),
            Effect::StopTicker => self.stop_ticker(),
            Effect::StartDictation => self.start_dictation(),
            Effect::StopDictation => {
                if let Some(dictation) = self.dictation.as_mut() {
                    dictation.stop();
                }
            }
            Effect::Exit => return false,
        }
        true
    }

    /// Replace the tick source. The old task is aborted before the new one
    /// is spawned; ticks it already queued carry a stale generation.
    fn start_ticker(&mut self, generation: u64) {
        self.stop_ticker();
        let tx = self.events_tx.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(Event::TimerTick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn start_dictation(&mut self) {
        let Some(dictation) = self.dictation.as_mut() else {
            return;
        };
        if let Err(e) = dictation.start() {
            warn!("❌ Could not start {}: {}", dictation.name(), e);
            let _ = self
                .dictation_tx
                .send(DictationEvent::Error("start-failed".to_string()));
            let _ = self.dictation_tx.send(DictationEvent::End);
        }
    }

    fn shutdown(&mut self) {
        self.stop_ticker();
        if let Some(dictation) = self.dictation.as_mut() {
            dictation.stop();
        }
    }
}
