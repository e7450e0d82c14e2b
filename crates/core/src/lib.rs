//! Core building blocks for the Sabaq tutoring service.
//!
//! This crate holds everything the WebSocket service shares across sessions:
//!
//! - `collaborator`: contracts (and HTTP clients) for the external speech,
//!   translation, synthesis, and scoring services.
//! - `offload`: a bounded worker pool that runs blocking collaborator calls
//!   off the async event loop.
//! - `cache`: a bounded LRU store for deterministic collaborator outputs.
//! - `script`: the bilingual drill prompts and the language-mode switch.

pub mod cache;
pub mod collaborator;
pub mod offload;
pub mod script;
