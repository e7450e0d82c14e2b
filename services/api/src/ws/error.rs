//! Session error taxonomy.

use sabaq_core::{collaborator::CollaboratorError, offload::OffloadError};

/// Everything that can interrupt a running session.
///
/// Protocol and decode problems are recovered in place (an `error` step goes
/// out and the current wait is retried). Collaborator and offload failures
/// reset the drill to listening. The rest end the session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("audio payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error(transparent)]
    Offload(#[from] OffloadError),
    #[error("websocket receive failed: {0}")]
    Transport(#[from] axum::Error),
    #[error("timed out waiting for `{0}` acknowledgment")]
    GateTimeout(&'static str),
    #[error("timed out waiting for learner audio")]
    ReceiveTimeout,
    #[error("client disconnected")]
    Disconnected,
}

impl SessionError {
    /// Whether the drill can survive this error by resetting to listening.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Collaborator(_) | Self::Offload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaborator_and_offload_failures_are_recoverable() {
        let collaborator = SessionError::Collaborator(CollaboratorError::Status {
            service: "translation",
            status: 500,
        });
        assert!(collaborator.is_recoverable());
        assert!(SessionError::Offload(OffloadError::TaskLost).is_recoverable());
    }

    #[test]
    fn timeouts_and_disconnects_are_fatal() {
        assert!(!SessionError::GateTimeout("you_said_complete").is_recoverable());
        assert!(!SessionError::ReceiveTimeout.is_recoverable());
        assert!(!SessionError::Disconnected.is_recoverable());
    }
}
