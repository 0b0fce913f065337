use padwire_frame::Frame;
use padwire_transport::{
    event_channel, ChannelBackend, ChannelEvent, EventReceiver, SdpType, WebRtcBackend,
};
use tokio::sync::mpsc::error::TryRecvError;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::signaling::{HttpSignaling, Signaling};
use crate::state::{SessionEvent, SessionState};

/// What happened to a frame passed to [`TransportSession::send_frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Handed to the channel for best-effort delivery.
    ///
    /// The channel can still discard it: a newer frame submitted before it
    /// is written replaces it, and a backlogged channel skips it. Counters
    /// built from this outcome are an upper bound on frames on the wire.
    Sent,
    /// Not transmitted: the session or its channel was not open.
    Dropped,
}

/// Frame counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub frames_sent: u64,
    pub frames_dropped: u64,
}

/// A session backed by a WebRTC data channel and HTTP signaling.
pub type WebRtcSession = TransportSession<WebRtcBackend, HttpSignaling>;

/// Owns one channel to the remote consumer and its lifecycle.
///
/// Construct it once, call [`negotiate`](Self::negotiate), then feed it
/// frames from the sampling loop. Channel notifications are applied to the
/// state machine synchronously before each send, so a session that closed
/// underneath the caller simply starts dropping frames.
pub struct TransportSession<B, S> {
    backend: B,
    signaling: S,
    state: SessionState,
    events: Option<EventReceiver>,
    stats: SessionStats,
    close_reason: Option<String>,
}

impl WebRtcSession {
    /// Build a WebRTC session from configuration. Does not touch the network.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let signaling =
            HttpSignaling::with_timeout(config.signaling_url.clone(), config.signaling_timeout)?;
        let backend = WebRtcBackend::new(config.channel.clone(), config.ice_servers.clone());
        Ok(Self::new(backend, signaling))
    }
}

impl<B: ChannelBackend, S: Signaling> TransportSession<B, S> {
    /// Create a session in the `Uninitialized` state.
    pub fn new(backend: B, signaling: S) -> Self {
        Self {
            backend,
            signaling,
            state: SessionState::Uninitialized,
            events: None,
            stats: SessionStats::default(),
            close_reason: None,
        }
    }

    /// Current state, without applying pending channel notifications.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Apply pending channel notifications and return the current state.
    pub fn poll_state(&mut self) -> SessionState {
        while let Some(events) = self.events.as_mut() {
            match events.try_recv() {
                Ok(event) => self.on_channel_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.events = None;
                    if self.state.is_open() {
                        self.on_channel_event(ChannelEvent::Closed);
                    }
                }
            }
        }
        self.state
    }

    /// Frame counters so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Why the session closed, if it closed because something failed.
    pub fn close_reason(&self) -> Option<&str> {
        self.close_reason.as_deref()
    }

    /// The channel backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run the offer/answer exchange and wait for the channel to open.
    ///
    /// Moves to `Open` on success and to `Closed` on any failure. Only valid
    /// from `Uninitialized`; a session negotiates at most once. No timeout is
    /// applied here: wrap the call if startup must be bounded, then
    /// [`close`](Self::close) the session if the timeout fires.
    pub async fn negotiate(&mut self) -> Result<()> {
        if self.state != SessionState::Uninitialized {
            return Err(SessionError::InvalidState {
                operation: "negotiate",
                state: self.state,
            });
        }
        self.apply(SessionEvent::NegotiationStarted)?;

        match self.run_negotiation().await {
            Ok(()) => {
                self.apply(SessionEvent::ChannelOpened)?;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "negotiation failed");
                self.close_reason = Some(err.to_string());
                self.apply(SessionEvent::NegotiationFailed)?;
                self.release_backend().await;
                Err(err)
            }
        }
    }

    /// Offer a frame for best-effort delivery.
    ///
    /// The frame is handed to the channel only when the session is `Open`
    /// and the channel can take it right now. Otherwise it is dropped:
    /// nothing is queued and nothing is raised.
    pub fn send_frame(&mut self, frame: &Frame) -> SendOutcome {
        let outcome = if self.poll_state().is_open() && self.backend.try_submit(frame.to_bytes()) {
            SendOutcome::Sent
        } else {
            SendOutcome::Dropped
        };

        match outcome {
            SendOutcome::Sent => self.stats.frames_sent += 1,
            SendOutcome::Dropped => {
                self.stats.frames_dropped += 1;
                tracing::trace!(state = %self.state, slot = frame.slot(), "frame dropped");
            }
        }
        outcome
    }

    /// Tear the session down from any state.
    ///
    /// Subsequent sends are dropped. Frames already handed to the channel are
    /// not recalled. Calling this again is harmless.
    pub async fn close(&mut self) -> Result<()> {
        self.poll_state();
        self.apply(SessionEvent::Shutdown)?;
        self.events = None;
        self.backend.close().await?;
        Ok(())
    }

    async fn run_negotiation(&mut self) -> Result<()> {
        let (tx, rx) = event_channel();
        self.events = Some(rx);

        let offer = self.backend.create_offer(tx).await?;
        tracing::debug!(?offer, "local offer applied");

        let answer = self.signaling.exchange(&offer).await?;
        if answer.sdp_type != SdpType::Answer {
            return Err(SessionError::UnexpectedAnswer(answer.sdp_type));
        }
        self.backend.accept_answer(answer).await?;
        tracing::debug!("remote answer applied, waiting for channel");

        self.wait_until_ready().await
    }

    async fn wait_until_ready(&mut self) -> Result<()> {
        let events = self.events.as_mut().ok_or(SessionError::ChannelClosed)?;
        match events.recv().await {
            Some(ChannelEvent::Opened) => Ok(()),
            Some(ChannelEvent::Closed) | None => Err(SessionError::ChannelClosed),
            Some(ChannelEvent::Failed(reason)) => Err(SessionError::ChannelFailed(reason)),
        }
    }

    fn on_channel_event(&mut self, event: ChannelEvent) {
        let session_event = SessionEvent::from(&event);
        match self.state.transition(session_event) {
            Ok(next) => {
                if next.is_closed() && !self.state.is_closed() {
                    self.close_reason.get_or_insert_with(|| match &event {
                        ChannelEvent::Failed(reason) => reason.clone(),
                        _ => "channel closed by remote".to_string(),
                    });
                    tracing::warn!(from = %self.state, event = %session_event, "channel lost");
                }
                self.set_state(next);
            }
            Err(err) => tracing::debug!(error = %err, "ignoring channel event"),
        }
    }

    fn apply(&mut self, event: SessionEvent) -> Result<()> {
        let next = self.state.transition(event)?;
        self.set_state(next);
        Ok(())
    }

    fn set_state(&mut self, next: SessionState) {
        if next != self.state {
            tracing::info!(from = %self.state, to = %next, "session state changed");
        }
        self.state = next;
    }

    async fn release_backend(&mut self) {
        self.events = None;
        if let Err(err) = self.backend.close().await {
            tracing::debug!(error = %err, "backend close failed");
        }
    }
}

impl<B, S> std::fmt::Debug for TransportSession<B, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportSession")
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field("close_reason", &self.close_reason)
            .finish()
    }
}
