//! Blocks phase advancement until a specific acknowledgment arrives.
//!
//! The client confirms playback of each step with a typed control frame. The
//! gate absorbs everything else it sees along the way: language-mode
//! overrides are applied (last write wins), frames with other `type` values
//! or stray payloads are dropped, and malformed frames are skipped with a
//! warning — a single bad frame never ends the session. The whole wait is
//! bounded; expiry closes the session instead of leaking it.

use super::{
    drill::Session,
    error::SessionError,
    protocol::{Ack, ClientFrame},
    transport::SessionTransport,
};
use std::time::Duration;
use tracing::{debug, warn};

pub async fn await_ack<T: SessionTransport + ?Sized>(
    transport: &mut T,
    session: &mut Session,
    target: Ack,
    timeout: Duration,
) -> Result<(), SessionError> {
    let wait = async {
        loop {
            let raw = transport.recv_text().await?;
            let frame: ClientFrame = match serde_json::from_str(&raw) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(error = %e, %target, "skipping malformed frame during ack wait");
                    continue;
                }
            };
            session.absorb(&frame);
            if frame.kind.as_deref() == Some(target.as_str()) {
                return Ok(());
            }
            debug!(%target, received = ?frame.kind, "absorbed non-target frame during ack wait");
        }
    };
    match tokio::time::timeout(timeout, wait).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::GateTimeout(target.as_str())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::testing::MockTransport;
    use sabaq_core::script::LanguageMode;

    const GATE_TIMEOUT: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn returns_on_exact_type_match() {
        let mut transport = MockTransport::new([r#"{"type": "you_said_complete"}"#]);
        let mut session = Session::new();
        await_ack(&mut transport, &mut session, Ack::YouSaidComplete, GATE_TIMEOUT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn absorbs_non_target_frames_without_advancing() {
        let mut transport = MockTransport::new([
            r#"{"type": "feedback_complete"}"#,
            r#"{"audio_base64": "AAAA"}"#,
            r#"{}"#,
            r#"{"type": "word_by_word_complete"}"#,
        ]);
        let mut session = Session::new();
        await_ack(&mut transport, &mut session, Ack::WordByWordComplete, GATE_TIMEOUT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn applies_language_mode_overrides_while_waiting() {
        let mut transport = MockTransport::new([
            r#"{"language_mode": "english"}"#,
            r#"{"type": "you_said_complete"}"#,
        ]);
        let mut session = Session::new();
        assert_eq!(session.language_mode, LanguageMode::Urdu);
        await_ack(&mut transport, &mut session, Ack::YouSaidComplete, GATE_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(session.language_mode, LanguageMode::English);
    }

    #[tokio::test]
    async fn last_language_mode_override_wins() {
        let mut transport = MockTransport::new([
            r#"{"language_mode": "english"}"#,
            r#"{"type": "you_said_complete", "language_mode": "urdu"}"#,
        ]);
        let mut session = Session::new();
        await_ack(&mut transport, &mut session, Ack::YouSaidComplete, GATE_TIMEOUT)
            .await
            .unwrap();
        assert_eq!(session.language_mode, LanguageMode::Urdu);
    }

    #[tokio::test]
    async fn skips_malformed_frames_with_a_warning() {
        let mut transport = MockTransport::new([
            "this is not json",
            r#"{"type": "feedback_complete"}"#,
        ]);
        let mut session = Session::new();
        await_ack(&mut transport, &mut session, Ack::FeedbackComplete, GATE_TIMEOUT)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn disconnect_during_wait_surfaces() {
        let mut transport = MockTransport::new([r#"{"type": "feedback_complete"}"#]);
        let mut session = Session::new();
        let result = await_ack(
            &mut transport,
            &mut session,
            Ack::YouSaidComplete,
            GATE_TIMEOUT,
        )
        .await;
        assert!(matches!(result, Err(SessionError::Disconnected)));
    }

    #[tokio::test]
    async fn bounded_wait_times_out() {
        let mut transport = MockTransport::pending();
        let mut session = Session::new();
        let result = await_ack(
            &mut transport,
            &mut session,
            Ack::YouSaidComplete,
            Duration::from_millis(20),
        )
        .await;
        assert!(matches!(
            result,
            Err(SessionError::GateTimeout("you_said_complete"))
        ));
    }
}
