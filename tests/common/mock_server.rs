//! Mock Practice Server for Testing
//!
//! Returns scripted replies and records every request it receives.

use async_trait::async_trait;
use lexitalk::client::{FinishReply, FinishRequest, ModeReply, PracticeServer, ResponseReply};
use lexitalk::error::{PracticeError, PracticeResult};
use lexitalk::session::{Mode, Question};
use std::collections::VecDeque;
use std::sync::Mutex;

/// One request as the server saw it
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Open,
    SelectMode(Mode),
    Response(String),
    Finish(FinishRequest),
}

#[derive(Debug, Default)]
pub struct MockServer {
    pub greeting_question: Mutex<Option<Question>>,
    pub replies: Mutex<VecDeque<ResponseReply>>,
    pub closing: Mutex<Option<String>>,
    /// Every call fails with a transport-style error while set
    pub should_fail: Mutex<bool>,
    pub requests: Mutex<Vec<Request>>,
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_question(question: Question) -> Self {
        let server = Self::new();
        *server.greeting_question.lock().unwrap() = Some(question);
        server
    }

    pub fn push_reply(&self, reply: ResponseReply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn set_failing(&self, fail: bool) {
        *self.should_fail.lock().unwrap() = fail;
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn responses(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter_map(|r| match r {
                Request::Response(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn record(&self, request: Request) -> PracticeResult<()> {
        self.requests.lock().unwrap().push(request);
        if *self.should_fail.lock().unwrap() {
            return Err(PracticeError::Status {
                status: 500,
                body: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PracticeServer for MockServer {
    async fn open_session(&self) -> PracticeResult<()> {
        self.record(Request::Open)
    }

    async fn select_mode(&self, mode: Mode) -> PracticeResult<ModeReply> {
        self.record(Request::SelectMode(mode))?;
        Ok(ModeReply {
            greeting: format!("Welcome to {} practice.", mode),
            speech_url: format!("static/audio/greeting_{}.mp3", mode.tag()),
            question: self.greeting_question.lock().unwrap().clone(),
        })
    }

    async fn process_response(&self, response: &str) -> PracticeResult<ResponseReply> {
        self.record(Request::Response(response.to_string()))?;
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_else(|| ResponseReply {
            response: "Good try!".to_string(),
            ..ResponseReply::default()
        }))
    }

    async fn finish(&self, request: &FinishRequest) -> PracticeResult<FinishReply> {
        self.record(Request::Finish(request.clone()))?;
        Ok(FinishReply {
            speech_url: "static/audio/finish.mp3".to_string(),
            message: self.closing.lock().unwrap().clone(),
        })
    }

    fn media_url(&self, reference: &str) -> String {
        format!("http://mock/{}", reference)
    }
}
