//! Scripted doubles for drill, gate, and orchestrator tests.

use super::{error::SessionError, protocol::ServerFrame, transport::SessionTransport};
use crate::{config::Config, state::AppState};
use async_trait::async_trait;
use bytes::Bytes;
use sabaq_core::{
    cache::BoundedCache,
    collaborator::{
        Assessment, CollaboratorError, Scorer, SpeechToText, Synthesizer, Transcript, Translator,
    },
    offload::WorkerPool,
    script::LanguageMode,
};
use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

/// Everything the drill sent, in wire order.
#[derive(Debug)]
pub enum Sent {
    Frame(ServerFrame),
    Audio(Bytes),
}

/// A transport with a scripted inbound queue that records all outbound
/// traffic. An exhausted queue reads as a disconnect, unless constructed
/// with [`MockTransport::pending`], which then waits forever.
pub struct MockTransport {
    inbound: VecDeque<String>,
    hang_when_empty: bool,
    pub sent: Vec<Sent>,
}

impl MockTransport {
    pub fn new<I, S>(inbound: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inbound: inbound.into_iter().map(Into::into).collect(),
            hang_when_empty: false,
            sent: Vec::new(),
        }
    }

    /// A transport whose peer never sends anything.
    pub fn pending() -> Self {
        Self {
            inbound: VecDeque::new(),
            hang_when_empty: true,
            sent: Vec::new(),
        }
    }
}

#[async_trait]
impl SessionTransport for MockTransport {
    async fn recv_text(&mut self) -> Result<String, SessionError> {
        match self.inbound.pop_front() {
            Some(text) => Ok(text),
            None if self.hang_when_empty => std::future::pending().await,
            None => Err(SessionError::Disconnected),
        }
    }

    async fn send_frame(&mut self, frame: ServerFrame) {
        self.sent.push(Sent::Frame(frame));
    }

    async fn send_audio(&mut self, audio: Bytes) {
        self.sent.push(Sent::Audio(audio));
    }
}

/// A minimal valid audio submission frame (`"AAAA"` decodes fine).
pub fn audio_frame() -> String {
    r#"{"audio_base64": "AAAA"}"#.to_string()
}

fn unavailable(service: &'static str) -> CollaboratorError {
    CollaboratorError::Status {
        service,
        status: 503,
    }
}

/// Pops one scripted transcript per call.
pub struct StubStt {
    replies: Mutex<VecDeque<Transcript>>,
    fail: bool,
}

impl StubStt {
    pub fn new(replies: Vec<Transcript>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fail: true,
        }
    }
}

impl SpeechToText for StubStt {
    fn transcribe(&self, _audio: &[u8]) -> Result<Transcript, CollaboratorError> {
        if self.fail {
            return Err(unavailable("transcription"));
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transcripts exhausted"))
    }
}

/// Fixed translations, optionally slowing the Urdu leg to reorder completion.
pub struct StubTranslator {
    urdu: String,
    english: String,
    urdu_delay: Duration,
    fail: bool,
    calls: AtomicUsize,
}

impl StubTranslator {
    pub fn new(urdu: &str, english: &str) -> Self {
        Self::with_urdu_delay(urdu, english, Duration::ZERO)
    }

    pub fn with_urdu_delay(urdu: &str, english: &str, urdu_delay: Duration) -> Self {
        Self {
            urdu: urdu.to_string(),
            english: english.to_string(),
            urdu_delay,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("", "")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for StubTranslator {
    fn to_english(&self, _text: &str) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(unavailable("translation"));
        }
        Ok(self.english.clone())
    }

    fn to_urdu(&self, _text: &str) -> Result<String, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(unavailable("translation"));
        }
        if !self.urdu_delay.is_zero() {
            std::thread::sleep(self.urdu_delay);
        }
        Ok(self.urdu.clone())
    }
}

/// Deterministic audio: the bytes are `audio:` plus the synthesized text.
pub struct StubSynthesizer {
    calls: AtomicUsize,
}

impl StubSynthesizer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Synthesizer for StubSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Bytes, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Bytes::from(format!("audio:{text}")))
    }
}

/// Pops one scripted verdict per call.
pub struct StubScorer {
    verdicts: Mutex<VecDeque<Assessment>>,
}

impl StubScorer {
    pub fn new(verdicts: Vec<Assessment>) -> Self {
        Self {
            verdicts: Mutex::new(verdicts.into()),
        }
    }
}

impl Scorer for StubScorer {
    fn assess(
        &self,
        _reference: &str,
        _attempt: &str,
        _mode: LanguageMode,
    ) -> Result<Assessment, CollaboratorError> {
        Ok(self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted verdicts exhausted"))
    }
}

/// Assembles an `AppState` around the given collaborators with a small pool,
/// small caches, and short timeouts.
pub fn app_state(
    stt: Arc<dyn SpeechToText>,
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn Synthesizer>,
    scorer: Arc<dyn Scorer>,
) -> AppState {
    AppState {
        stt,
        translator,
        synthesizer,
        scorer,
        pool: Arc::new(WorkerPool::new(2)),
        speech_cache: Arc::new(BoundedCache::new(64)),
        english_cache: Arc::new(BoundedCache::new(64)),
        urdu_cache: Arc::new(BoundedCache::new(64)),
        config: Arc::new(test_config()),
    }
}

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        transcription_url: "http://stt.invalid".to_string(),
        translation_url: "http://translate.invalid".to_string(),
        speech_url: "http://tts.invalid".to_string(),
        scoring_url: "http://score.invalid".to_string(),
        collaborator_api_key: None,
        worker_count: 2,
        cache_capacity: 64,
        gate_timeout: Duration::from_secs(5),
        receive_timeout: Duration::from_secs(5),
        log_level: tracing::Level::INFO,
    }
}
