//! Practice Server Client
//!
//! The server owns scoring, question order and speech synthesis. This module
//! only speaks its three JSON endpoints plus the index page that opens the
//! cookie-backed server session.

use crate::config::Config;
use crate::error::{PracticeError, PracticeResult};
use crate::session::{Mode, Question};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, warn};

/// Reply to `POST /select_mode`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModeReply {
    pub greeting: String,
    #[serde(default)]
    pub speech_url: String,
    #[serde(default, deserialize_with = "lenient_question")]
    pub question: Option<Question>,
}

/// Reply to `POST /process_response`
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct ResponseReply {
    pub response: String,
    #[serde(default)]
    pub speech_url: String,
    #[serde(default, deserialize_with = "lenient_question")]
    pub next_question: Option<Question>,
    #[serde(default)]
    pub end_of_mode: bool,
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub question_count: Option<u32>,
}

/// Body of `POST /finish`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinishRequest {
    pub mode: Mode,
    pub score: u32,
    pub question_count: u32,
}

/// Reply to `POST /finish`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FinishReply {
    #[serde(default)]
    pub speech_url: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// A question the client cannot recognise is dropped with a warning instead
/// of failing the whole reply.
fn lenient_question<'de, D>(deserializer: D) -> Result<Option<Question>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => match serde_json::from_value::<Question>(raw.clone()) {
            Ok(question) => Some(question),
            Err(e) => {
                warn!("❓ Ignoring unrecognised question payload ({}): {}", e, raw);
                None
            }
        },
    })
}

/// Trait for the practice server collaborator
#[async_trait]
pub trait PracticeServer: Send + Sync {
    /// Open (or reset) the server-side session
    async fn open_session(&self) -> PracticeResult<()>;

    async fn select_mode(&self, mode: Mode) -> PracticeResult<ModeReply>;

    async fn process_response(&self, response: &str) -> PracticeResult<ResponseReply>;

    async fn finish(&self, request: &FinishRequest) -> PracticeResult<FinishReply>;

    /// Turn a `speech_url` from a reply into something the audio player can fetch
    fn media_url(&self, reference: &str) -> String {
        reference.to_string()
    }
}

/// HTTP implementation of [`PracticeServer`]
#[derive(Clone)]
pub struct HttpPracticeClient {
    base: Url,
    http: reqwest::Client,
}

impl HttpPracticeClient {
    /// Create a client from config
    pub fn new(config: &Config) -> PracticeResult<Self> {
        let base = parse_base_url(&config.server_url)?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout())
            .build()?;

        info!("🌐 Practice server: {}", base);
        Ok(Self { base, http })
    }

    /// Shared HTTP client, reused for audio downloads
    pub fn http(&self) -> reqwest::Client {
        self.http.clone()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> PracticeResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| PracticeError::Config(format!("bad endpoint {path}: {e}")))
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        response: reqwest::Response,
    ) -> PracticeResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("❌ {} returned {}: {}", endpoint, status, body);
            return Err(PracticeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("📨 {} raw body: {}", endpoint, body);

        serde_json::from_str(&body).map_err(|e| {
            warn!(
                "❌ Failed to deserialize {} reply: {} - Body: {}",
                endpoint, e, body
            );
            PracticeError::Payload(format!("{endpoint}: {e}"))
        })
    }
}

#[async_trait]
impl PracticeServer for HttpPracticeClient {
    async fn open_session(&self) -> PracticeResult<()> {
        let response = self.http.get(self.base.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PracticeError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        debug!("🍪 Server session opened");
        Ok(())
    }

    async fn select_mode(&self, mode: Mode) -> PracticeResult<ModeReply> {
        let response = self
            .http
            .post(self.endpoint("/select_mode")?)
            .form(&[("mode", mode.tag())])
            .send()
            .await?;
        self.read_json("/select_mode", response).await
    }

    async fn process_response(&self, text: &str) -> PracticeResult<ResponseReply> {
        let response = self
            .http
            .post(self.endpoint("/process_response")?)
            .form(&[("response", text)])
            .send()
            .await?;
        self.read_json("/process_response", response).await
    }

    async fn finish(&self, request: &FinishRequest) -> PracticeResult<FinishReply> {
        let response = self
            .http
            .post(self.endpoint("/finish")?)
            .json(request)
            .send()
            .await?;
        self.read_json("/finish", response).await
    }

    fn media_url(&self, reference: &str) -> String {
        match self.base.join(reference) {
            Ok(url) => url.to_string(),
            Err(e) => {
                warn!("⚠️ Could not resolve speech url '{}': {}", reference, e);
                reference.to_string()
            }
        }
    }
}

/// Parse the configured server URL, making sure relative joins keep its path
fn parse_base_url(raw: &str) -> PracticeResult<Url> {
    let mut base = Url::parse(raw.trim())
        .map_err(|e| PracticeError::Config(format!("invalid server_url '{raw}': {e}")))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}
