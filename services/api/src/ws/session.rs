//! Manages the WebSocket connection lifecycle for a tutoring session.

use super::{
    drill::DrillRunner,
    error::SessionError,
    transport::WsTransport,
};
use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use sabaq_core::script;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
///
/// Each connection gets its own session id, its own drill state, and its own
/// task; the only things sessions share are the worker pool, the caches, and
/// the collaborator clients.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = Uuid::new_v4();
    let span = info_span!("learn_session", %session_id);
    async move {
        info!("learner connected");
        spawn_prewarm(Arc::clone(&state));

        let mut transport = WsTransport::new(socket);
        let mut runner = DrillRunner::new(&state, &mut transport);
        match runner.run().await {
            Err(SessionError::Disconnected) => {
                info!(turns = runner.session.turns_completed, "learner disconnected");
            }
            Err(e) => error!(error = %e, "session ended with error"),
            Ok(()) => {} // the drill loop only exits by error
        }
    }
    .instrument(span)
    .await;
}

/// Best-effort warmup of the speech cache with the common short prompts, so
/// the error and edge-case paths answer without waiting on synthesis.
/// Individual failures are ignored.
fn spawn_prewarm(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(async move {
        for line in script::PREWARM_LINES {
            if state.speech_cache.get(line).is_some() {
                continue;
            }
            let task = {
                let synthesizer = Arc::clone(&state.synthesizer);
                state.pool.submit(move || synthesizer.synthesize(line))
            };
            match task.join().await {
                Ok(Ok(audio)) => state.speech_cache.put(line, audio),
                Ok(Err(e)) => debug!(error = %e, line, "pre-warm synthesis failed"),
                Err(e) => debug!(error = %e, line, "pre-warm task lost"),
            }
        }
    })
}
