//! The seam between the drill logic and the raw socket.
//!
//! Sends are best-effort, mirroring the delivery policy for a session that is
//! already going away: a failed send is logged and swallowed so one bad frame
//! never crashes the drill. Receives surface disconnects and socket errors so
//! the session can terminate cleanly.

use super::{error::SessionError, protocol::ServerFrame};
use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tracing::{error, warn};

#[async_trait]
pub trait SessionTransport: Send {
    /// Waits for the next text frame, absorbing pings and stray binary
    /// frames. Returns `Disconnected` once the peer is gone.
    async fn recv_text(&mut self) -> Result<String, SessionError>;
    async fn send_frame(&mut self, frame: ServerFrame);
    async fn send_audio(&mut self, audio: Bytes);
}

/// Production transport over an upgraded axum WebSocket.
pub struct WsTransport {
    tx: SplitSink<WebSocket, Message>,
    rx: SplitStream<WebSocket>,
}

impl WsTransport {
    pub fn new(socket: WebSocket) -> Self {
        let (tx, rx) = socket.split();
        Self { tx, rx }
    }
}

#[async_trait]
impl SessionTransport for WsTransport {
    async fn recv_text(&mut self) -> Result<String, SessionError> {
        while let Some(message) = self.rx.next().await {
            match message {
                Ok(Message::Text(text)) => return Ok(text.to_string()),
                Ok(Message::Binary(_)) => {
                    warn!("ignoring unexpected binary frame from client");
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(Message::Close(_)) => return Err(SessionError::Disconnected),
                Err(e) => return Err(SessionError::Transport(e)),
            }
        }
        Err(SessionError::Disconnected)
    }

    async fn send_frame(&mut self, frame: ServerFrame) {
        match serde_json::to_string(&frame) {
            Ok(json) => {
                if let Err(e) = self.tx.send(Message::Text(json.into())).await {
                    warn!(error = %e, step = ?frame.step, "failed to send JSON frame");
                }
            }
            Err(e) => error!(error = %e, "failed to serialize server frame"),
        }
    }

    async fn send_audio(&mut self, audio: Bytes) {
        if let Err(e) = self.tx.send(Message::Binary(audio)).await {
            warn!(error = %e, "failed to send binary audio frame");
        }
    }
}
