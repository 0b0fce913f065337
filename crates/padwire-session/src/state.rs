use std::fmt;

use padwire_transport::ChannelEvent;

use crate::error::{Result, SessionError};

/// Lifecycle state of a [`TransportSession`](crate::TransportSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    /// Constructed; negotiation has not started.
    #[default]
    Uninitialized,
    /// Offer/answer exchange in progress, channel not ready yet.
    Negotiating,
    /// Channel ready; frames may be sent.
    Open,
    /// Terminal. A new session is needed to try again.
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Negotiating => "negotiating",
            Self::Open => "open",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Inputs to the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// The owner started negotiation.
    NegotiationStarted,
    /// The channel reported it is ready.
    ChannelOpened,
    /// A negotiation step failed.
    NegotiationFailed,
    /// The channel or its connection closed.
    ChannelClosed,
    /// The channel or its connection failed.
    ChannelFailed,
    /// The owner tore the session down.
    Shutdown,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NegotiationStarted => "negotiation-started",
            Self::ChannelOpened => "channel-opened",
            Self::NegotiationFailed => "negotiation-failed",
            Self::ChannelClosed => "channel-closed",
            Self::ChannelFailed => "channel-failed",
            Self::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

impl From<&ChannelEvent> for SessionEvent {
    fn from(event: &ChannelEvent) -> Self {
        match event {
            ChannelEvent::Opened => Self::ChannelOpened,
            ChannelEvent::Closed => Self::ChannelClosed,
            ChannelEvent::Failed(_) => Self::ChannelFailed,
        }
    }
}

impl SessionState {
    /// Returns `true` when frames may be handed to the channel.
    pub fn is_open(self) -> bool {
        self == Self::Open
    }

    /// Returns `true` once the session can no longer carry frames.
    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }

    /// Compute the state that follows `event`.
    ///
    /// `Closed` absorbs every teardown event so late notifications after a
    /// close are harmless. Anything else not listed is rejected.
    pub fn transition(self, event: SessionEvent) -> Result<Self> {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Uninitialized, NegotiationStarted) => Ok(Negotiating),
            (Uninitialized, Shutdown) => Ok(Closed),

            (Negotiating, ChannelOpened) => Ok(Open),
            (Negotiating, NegotiationFailed | ChannelClosed | ChannelFailed | Shutdown) => {
                Ok(Closed)
            }

            (Open, ChannelClosed | ChannelFailed | Shutdown) => Ok(Closed),

            (Closed, NegotiationFailed | ChannelClosed | ChannelFailed | Shutdown) => Ok(Closed),

            (from, event) => Err(SessionError::InvalidTransition { from, event }),
        }
    }
}
