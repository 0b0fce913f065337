use padwire_transport::{SdpType, TransportError};

use crate::state::{SessionEvent, SessionState};

/// Errors that can occur while negotiating or tearing down a session.
///
/// Dropped frames are not errors and never show up here.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Channel backend error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The signaling request could not be completed.
    #[error("signaling request failed: {0}")]
    Signaling(#[source] reqwest::Error),

    /// The signaling endpoint answered with a non-success status.
    #[error("signaling endpoint returned HTTP {0}")]
    SignalingStatus(u16),

    /// The signaling response was not a session description.
    #[error("malformed answer: {0}")]
    MalformedAnswer(#[source] serde_json::Error),

    /// The signaling response was a description of the wrong kind.
    #[error("expected an answer, got '{0}'")]
    UnexpectedAnswer(SdpType),

    /// The channel closed before it became ready.
    #[error("channel closed before it was ready")]
    ChannelClosed,

    /// The channel reported a failure before it became ready.
    #[error("channel failed: {0}")]
    ChannelFailed(String),

    /// The operation is not allowed in the current state.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// The state machine has no transition for this event.
    #[error("no transition from {from} on {event}")]
    InvalidTransition {
        from: SessionState,
        event: SessionEvent,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
