//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the process-scoped
//! resources every session shares: the collaborator clients, the worker
//! offload pool, and the bounded response caches. All of it is created once
//! at startup and dropped at process exit.

use crate::config::Config;
use bytes::Bytes;
use sabaq_core::{
    cache::BoundedCache,
    collaborator::{Scorer, SpeechToText, Synthesizer, Translator},
    offload::WorkerPool,
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct AppState {
    pub stt: Arc<dyn SpeechToText>,
    pub translator: Arc<dyn Translator>,
    pub synthesizer: Arc<dyn Synthesizer>,
    pub scorer: Arc<dyn Scorer>,
    pub pool: Arc<WorkerPool>,
    /// Synthesized speech, keyed by the exact prompt text.
    pub speech_cache: Arc<BoundedCache<Bytes>>,
    /// Urdu → English translation memoization.
    pub english_cache: Arc<BoundedCache<String>>,
    /// English/source → Urdu translation memoization.
    pub urdu_cache: Arc<BoundedCache<String>>,
    pub config: Arc<Config>,
}
