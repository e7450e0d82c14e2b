//! Sabaq API Library Crate
//!
//! This library contains all the core logic for the Sabaq tutoring service:
//! configuration, shared application state, routing, and the WebSocket drill
//! orchestration. The `bin/api.rs` binary is a thin wrapper around this
//! library.

pub mod config;
pub mod router;
pub mod state;
pub mod ws;
