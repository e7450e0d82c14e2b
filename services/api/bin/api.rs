//! Main Entrypoint for the Sabaq API Service
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment.
//! 2. Initializing logging.
//! 3. Building the shared resources: the blocking HTTP client, the
//!    collaborator clients, the worker pool, and the response caches.
//! 4. Constructing the Axum router and applying middleware.
//! 5. Starting the web server and handling graceful shutdown.
//!
//! The blocking HTTP client is built before the async runtime starts: its
//! requests only ever run on the worker pool's threads, never on the event
//! loop.

use anyhow::Context;
use bytes::Bytes;
use sabaq_api::{config::Config, router::create_router, state::AppState};
use sabaq_core::{
    cache::BoundedCache,
    collaborator::{
        HttpScorer, HttpSpeechToText, HttpSynthesizer, HttpTranslator, Scorer, SpeechToText,
        Synthesizer, Translator,
    },
    offload::WorkerPool,
};
use std::{sync::Arc, time::Duration};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Listens for the `Ctrl+C` signal to gracefully shut down the server.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Received shutdown signal. Shutting down gracefully...");
}

fn main() -> anyhow::Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Initializing shared resources...");

    // --- 3. Build Shared Resources ---
    let http = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("Failed to build HTTP client")?;

    let key = config.collaborator_api_key.clone();
    let stt: Arc<dyn SpeechToText> = Arc::new(HttpSpeechToText::new(
        http.clone(),
        config.transcription_url.clone(),
        key.clone(),
    ));
    let translator: Arc<dyn Translator> = Arc::new(HttpTranslator::new(
        http.clone(),
        config.translation_url.clone(),
        key.clone(),
    ));
    let synthesizer: Arc<dyn Synthesizer> = Arc::new(HttpSynthesizer::new(
        http.clone(),
        config.speech_url.clone(),
        key.clone(),
    ));
    let scorer: Arc<dyn Scorer> =
        Arc::new(HttpScorer::new(http, config.scoring_url.clone(), key));

    let app_state = Arc::new(AppState {
        stt,
        translator,
        synthesizer,
        scorer,
        pool: Arc::new(WorkerPool::new(config.worker_count)),
        speech_cache: Arc::new(BoundedCache::<Bytes>::new(config.cache_capacity)),
        english_cache: Arc::new(BoundedCache::<String>::new(config.cache_capacity)),
        urdu_cache: Arc::new(BoundedCache::<String>::new(config.cache_capacity)),
        config: Arc::new(config.clone()),
    });

    // --- 4. Start the Runtime and Serve ---
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build async runtime")?
        .block_on(serve(config, app_state))
}

async fn serve(config: Config, app_state: Arc<AppState>) -> anyhow::Result<()> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(app_state).layer(cors);

    info!(
        workers = config.worker_count,
        cache_capacity = config.cache_capacity,
        bind_address = %config.bind_address,
        "Service configured. Starting server..."
    );
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server has shut down.");
    Ok(())
}
