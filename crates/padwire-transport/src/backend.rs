use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::description::SessionDescription;
use crate::error::Result;

/// Lifecycle notification raised by a channel backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// The channel is ready to carry frames.
    Opened,
    /// The channel or its connection closed.
    Closed,
    /// The channel or its connection failed.
    Failed(String),
}

/// Sending half handed to a backend for its lifecycle events.
pub type EventSender = mpsc::UnboundedSender<ChannelEvent>;

/// Receiving half kept by the channel owner.
pub type EventReceiver = mpsc::UnboundedReceiver<ChannelEvent>;

/// Create a connected event sender/receiver pair.
///
/// Unbounded so that backend callbacks never block or wait.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// A negotiated, unordered, zero-retransmit channel.
///
/// Negotiation is split so the caller can run the signaling round trip
/// between [`create_offer`](Self::create_offer) and
/// [`accept_answer`](Self::accept_answer). Readiness and faults are reported
/// through the [`EventSender`] passed at creation.
#[async_trait]
pub trait ChannelBackend: Send {
    /// Create the channel, generate a local offer and apply it as the local
    /// description. Returns the offer to relay to the remote side.
    async fn create_offer(&mut self, events: EventSender) -> Result<SessionDescription>;

    /// Apply the remote answer.
    async fn accept_answer(&mut self, answer: SessionDescription) -> Result<()>;

    /// Hand a frame to the channel without waiting.
    ///
    /// Returns `false` when the channel cannot take it right now; the frame
    /// is then gone. Nothing is queued for later.
    fn try_submit(&self, payload: Bytes) -> bool;

    /// Tear down the channel and its connection.
    async fn close(&mut self) -> Result<()>;
}
