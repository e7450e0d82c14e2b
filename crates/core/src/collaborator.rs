//! Contracts for the external services the drill depends on.
//!
//! Transcription, translation, synthesis, and scoring are reached through
//! plain request/response calls. The traits here are deliberately synchronous:
//! every call runs on the worker pool (see [`crate::offload`]), so the HTTP
//! implementations use `reqwest`'s blocking client and never touch the async
//! event loop. One shared blocking client is built at startup and cloned into
//! each endpoint.

use bytes::Bytes;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};

use crate::script::LanguageMode;

#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned status {status}")]
    Status { service: &'static str, status: u16 },
}

/// What the transcription service heard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub language_code: String,
    #[serde(default)]
    pub is_english: bool,
}

/// The scoring service's verdict on one pronunciation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub is_correct: bool,
    pub feedback_text: String,
}

pub trait SpeechToText: Send + Sync {
    fn transcribe(&self, audio: &[u8]) -> Result<Transcript, CollaboratorError>;
}

pub trait Translator: Send + Sync {
    fn to_english(&self, text: &str) -> Result<String, CollaboratorError>;
    fn to_urdu(&self, text: &str) -> Result<String, CollaboratorError>;
}

pub trait Synthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<Bytes, CollaboratorError>;
}

pub trait Scorer: Send + Sync {
    /// Compares `attempt` against `reference`; `mode` selects the register
    /// the feedback text is written in.
    fn assess(
        &self,
        reference: &str,
        attempt: &str,
        mode: LanguageMode,
    ) -> Result<Assessment, CollaboratorError>;
}

/// One collaborator's base URL plus the shared blocking client.
#[derive(Clone)]
struct Endpoint {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    service: &'static str,
}

impl Endpoint {
    fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        service: &'static str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
            service,
        }
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let mut request = self.client.post(format!("{}{path}", self.base_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        request
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, CollaboratorError> {
        let response = request.send().map_err(|source| CollaboratorError::Request {
            service: self.service,
            source,
        })?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(CollaboratorError::Status {
                service: self.service,
                status: response.status().as_u16(),
            })
        }
    }

    fn request_error(&self, source: reqwest::Error) -> CollaboratorError {
        CollaboratorError::Request {
            service: self.service,
            source,
        }
    }
}

pub struct HttpSpeechToText {
    endpoint: Endpoint,
}

impl HttpSpeechToText {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, api_key, "transcription"),
        }
    }
}

impl SpeechToText for HttpSpeechToText {
    fn transcribe(&self, audio: &[u8]) -> Result<Transcript, CollaboratorError> {
        let request = self
            .endpoint
            .post("/v1/transcriptions")
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(audio.to_vec());
        self.endpoint
            .send(request)?
            .json()
            .map_err(|e| self.endpoint.request_error(e))
    }
}

#[derive(Deserialize)]
struct TranslationReply {
    translation: String,
}

pub struct HttpTranslator {
    endpoint: Endpoint,
}

impl HttpTranslator {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, api_key, "translation"),
        }
    }

    fn translate(&self, text: &str, target: &str) -> Result<String, CollaboratorError> {
        let request = self
            .endpoint
            .post("/v1/translations")
            .json(&serde_json::json!({ "text": text, "target": target }));
        let reply: TranslationReply = self
            .endpoint
            .send(request)?
            .json()
            .map_err(|e| self.endpoint.request_error(e))?;
        Ok(reply.translation)
    }
}

impl Translator for HttpTranslator {
    fn to_english(&self, text: &str) -> Result<String, CollaboratorError> {
        self.translate(text, "english")
    }

    fn to_urdu(&self, text: &str) -> Result<String, CollaboratorError> {
        self.translate(text, "urdu")
    }
}

pub struct HttpSynthesizer {
    endpoint: Endpoint,
}

impl HttpSynthesizer {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, api_key, "synthesis"),
        }
    }
}

impl Synthesizer for HttpSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Bytes, CollaboratorError> {
        let request = self
            .endpoint
            .post("/v1/speech")
            .json(&serde_json::json!({ "text": text }));
        self.endpoint
            .send(request)?
            .bytes()
            .map_err(|e| self.endpoint.request_error(e))
    }
}

pub struct HttpScorer {
    endpoint: Endpoint,
}

impl HttpScorer {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, api_key, "scoring"),
        }
    }
}

impl Scorer for HttpScorer {
    fn assess(
        &self,
        reference: &str,
        attempt: &str,
        mode: LanguageMode,
    ) -> Result<Assessment, CollaboratorError> {
        let request = self.endpoint.post("/v1/assessments").json(&serde_json::json!({
            "reference": reference,
            "attempt": attempt,
            "mode": mode,
        }));
        self.endpoint
            .send(request)?
            .json()
            .map_err(|e| self.endpoint.request_error(e))
    }
}
