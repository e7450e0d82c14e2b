use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub transcription_url: String,
    pub translation_url: String,
    pub speech_url: String,
    pub scoring_url: String,
    pub collaborator_api_key: Option<String>,
    pub worker_count: usize,
    pub cache_capacity: usize,
    /// Bound on each acknowledgment wait.
    pub gate_timeout: Duration,
    /// Bound on waits for learner audio (Listening and attempt submission).
    pub receive_timeout: Duration,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let transcription_url = require_var("TRANSCRIPTION_URL")?;
        let translation_url = require_var("TRANSLATION_URL")?;
        let speech_url = require_var("SPEECH_URL")?;
        let scoring_url = require_var("SCORING_URL")?;
        let collaborator_api_key = std::env::var("COLLABORATOR_API_KEY").ok();

        let worker_count = parse_var("WORKER_COUNT", sabaq_core::offload::DEFAULT_WORKERS)?;
        let cache_capacity = parse_var("CACHE_CAPACITY", sabaq_core::cache::DEFAULT_CAPACITY)?;
        let gate_timeout = Duration::from_secs(parse_var("GATE_TIMEOUT_SECS", 120u64)?);
        let receive_timeout = Duration::from_secs(parse_var("RECEIVE_TIMEOUT_SECS", 300u64)?);

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            bind_address,
            transcription_url,
            translation_url,
            speech_url,
            scoring_url,
            collaborator_api_key,
            worker_count,
            cache_capacity,
            gate_timeout,
            receive_timeout,
            log_level,
        })
    }
}

fn require_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(name.to_string(), raw)),
        Err(_) => Ok(default),
    }
}
