use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use webrtc::api::APIBuilder;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;

use crate::backend::{ChannelBackend, ChannelEvent, EventSender};
use crate::config::{ChannelConfig, IceServer, MAX_RETRANSMITS, ORDERED};
use crate::description::{SdpType, SessionDescription};
use crate::error::{Result, TransportError};

/// WebRTC data channel backend.
///
/// Owns one peer connection and one data channel created with
/// `ordered = false` and `max_retransmits = 0`. Sends go through a writer
/// task so [`try_submit`](ChannelBackend::try_submit) never waits. The task
/// holds at most one pending frame and a newer submit replaces it.
pub struct WebRtcBackend {
    config: ChannelConfig,
    ice_servers: Vec<IceServer>,
    peer: Option<Arc<RTCPeerConnection>>,
    channel: Option<Arc<RTCDataChannel>>,
    writer: Option<watch::Sender<Option<Bytes>>>,
    cancel: CancellationToken,
}

impl WebRtcBackend {
    /// Create a backend. No network activity happens until
    /// [`create_offer`](ChannelBackend::create_offer).
    pub fn new(config: ChannelConfig, ice_servers: Vec<IceServer>) -> Self {
        Self {
            config,
            ice_servers,
            peer: None,
            channel: None,
            writer: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Channel configuration in use.
    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    fn rtc_configuration(&self) -> RTCConfiguration {
        RTCConfiguration {
            ice_servers: self.ice_servers.iter().map(to_rtc_ice_server).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChannelBackend for WebRtcBackend {
    async fn create_offer(&mut self, events: EventSender) -> Result<SessionDescription> {
        if self.peer.is_some() {
            return Err(TransportError::AlreadyCreated);
        }

        let api = APIBuilder::new().build();
        let peer = Arc::new(
            api.new_peer_connection(self.rtc_configuration())
                .await
                .map_err(TransportError::webrtc("peer connection setup"))?,
        );
        // Keep the handle before anything else can fail so `close` releases it.
        self.peer = Some(Arc::clone(&peer));

        let init = RTCDataChannelInit {
            ordered: Some(ORDERED),
            max_retransmits: Some(MAX_RETRANSMITS),
            ..Default::default()
        };
        let channel = peer
            .create_data_channel(&self.config.label, Some(init))
            .await
            .map_err(TransportError::webrtc("data channel creation"))?;
        self.channel = Some(Arc::clone(&channel));
        tracing::debug!(
            label = %self.config.label,
            ordered = ORDERED,
            max_retransmits = MAX_RETRANSMITS,
            "data channel created"
        );

        forward_events(&peer, &channel, &events);

        let (tx, rx) = watch::channel(None);
        self.writer = Some(tx);
        tokio::spawn(run_writer(
            Arc::clone(&channel),
            rx,
            events,
            self.config.max_buffered_amount,
            self.cancel.clone(),
        ));

        let offer = peer
            .create_offer(None)
            .await
            .map_err(TransportError::webrtc("offer creation"))?;
        // The remote endpoint does not take trickled candidates, so the
        // offer is only read back once gathering has finished.
        let mut gathered = peer.gathering_complete_promise().await;
        peer.set_local_description(offer)
            .await
            .map_err(TransportError::webrtc("local description"))?;
        let _ = gathered.recv().await;

        let local = peer
            .local_description()
            .await
            .ok_or(TransportError::MissingLocalDescription)?;
        tracing::debug!(sdp_len = local.sdp.len(), "local offer ready");
        from_rtc_description(&local)
    }

    async fn accept_answer(&mut self, answer: SessionDescription) -> Result<()> {
        let peer = self.peer.as_ref().ok_or(TransportError::NotCreated)?;
        let remote = to_rtc_answer(answer)?;
        peer.set_remote_description(remote)
            .await
            .map_err(TransportError::webrtc("remote description"))?;
        tracing::debug!("remote answer applied");
        Ok(())
    }

    fn try_submit(&self, payload: Bytes) -> bool {
        let (Some(channel), Some(writer)) = (&self.channel, &self.writer) else {
            return false;
        };
        if channel.ready_state() != RTCDataChannelState::Open {
            return false;
        }
        if writer.is_closed() {
            return false;
        }
        writer.send_replace(Some(payload));
        true
    }

    async fn close(&mut self) -> Result<()> {
        self.cancel.cancel();
        self.writer = None;

        if let Some(channel) = self.channel.take() {
            if let Err(err) = channel.close().await {
                tracing::debug!(error = %err, "data channel close failed");
            }
        }
        if let Some(peer) = self.peer.take() {
            peer.close()
                .await
                .map_err(TransportError::webrtc("peer connection close"))?;
        }
        Ok(())
    }
}

impl Drop for WebRtcBackend {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for WebRtcBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebRtcBackend")
            .field("config", &self.config)
            .field("ice_servers", &self.ice_servers)
            .field("created", &self.peer.is_some())
            .finish()
    }
}

fn forward_events(peer: &RTCPeerConnection, channel: &RTCDataChannel, events: &EventSender) {
    let tx = events.clone();
    channel.on_open(Box::new(move || {
        tracing::info!("data channel open");
        let _ = tx.send(ChannelEvent::Opened);
        Box::pin(async {})
    }));

    let tx = events.clone();
    channel.on_close(Box::new(move || {
        tracing::info!("data channel closed");
        let _ = tx.send(ChannelEvent::Closed);
        Box::pin(async {})
    }));

    let tx = events.clone();
    channel.on_error(Box::new(move |err| {
        tracing::warn!(error = %err, "data channel error");
        let _ = tx.send(ChannelEvent::Failed(err.to_string()));
        Box::pin(async {})
    }));

    let tx = events.clone();
    peer.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
        tracing::debug!(%state, "peer connection state changed");
        match state {
            RTCPeerConnectionState::Failed => {
                let _ = tx.send(ChannelEvent::Failed("peer connection failed".to_string()));
            }
            RTCPeerConnectionState::Closed => {
                let _ = tx.send(ChannelEvent::Closed);
            }
            _ => {}
        }
        Box::pin(async {})
    }));
}

/// Where the writer task puts frames.
#[async_trait]
trait FrameSink: Send + Sync + 'static {
    /// Bytes queued in the channel but not yet on the wire.
    async fn backlog(&self) -> usize;

    async fn write(&self, payload: &Bytes) -> std::result::Result<(), String>;
}

#[async_trait]
impl FrameSink for RTCDataChannel {
    async fn backlog(&self) -> usize {
        self.buffered_amount().await
    }

    async fn write(&self, payload: &Bytes) -> std::result::Result<(), String> {
        self.send(payload).await.map(|_| ()).map_err(|err| err.to_string())
    }
}

/// Send the latest pending frame whenever one arrives. Frames replaced
/// while a write is in flight are never sent.
async fn run_writer<S: FrameSink>(
    sink: Arc<S>,
    mut frames: watch::Receiver<Option<Bytes>>,
    events: EventSender,
    max_buffered_amount: usize,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            changed = frames.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
        let Some(payload) = frames.borrow_and_update().clone() else {
            continue;
        };

        let buffered = sink.backlog().await;
        if buffered > max_buffered_amount {
            tracing::trace!(buffered, "channel backlogged, frame skipped");
            continue;
        }

        if let Err(err) = sink.write(&payload).await {
            tracing::warn!(error = %err, "data channel send failed");
            let _ = events.send(ChannelEvent::Failed(err));
            break;
        }
    }
    tracing::debug!("channel writer stopped");
}

fn to_rtc_ice_server(server: &IceServer) -> RTCIceServer {
    RTCIceServer {
        urls: server.urls.clone(),
        username: server.username.clone().unwrap_or_default(),
        credential: server.credential.clone().unwrap_or_default(),
        ..Default::default()
    }
}

fn from_rtc_description(desc: &RTCSessionDescription) -> Result<SessionDescription> {
    let sdp_type = match desc.sdp_type {
        RTCSdpType::Offer => SdpType::Offer,
        RTCSdpType::Pranswer => SdpType::Pranswer,
        RTCSdpType::Answer => SdpType::Answer,
        RTCSdpType::Rollback => SdpType::Rollback,
        RTCSdpType::Unspecified => return Err(TransportError::MissingLocalDescription),
    };
    Ok(SessionDescription {
        sdp_type,
        sdp: desc.sdp.clone(),
    })
}

fn to_rtc_answer(answer: SessionDescription) -> Result<RTCSessionDescription> {
    match answer.sdp_type {
        SdpType::Answer => RTCSessionDescription::answer(answer.sdp)
            .map_err(TransportError::webrtc("answer parsing")),
        got => Err(TransportError::UnexpectedDescription {
            expected: SdpType::Answer,
            got,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::{mpsc, Semaphore};

    use super::*;
    use crate::backend::event_channel;

    /// Reports every write as it starts, then holds it until the test
    /// hands out a permit.
    struct GatedSink {
        started: mpsc::UnboundedSender<Bytes>,
        gate: Semaphore,
        backlog: usize,
    }

    #[async_trait]
    impl FrameSink for GatedSink {
        async fn backlog(&self) -> usize {
            self.backlog
        }

        async fn write(&self, payload: &Bytes) -> std::result::Result<(), String> {
            let _ = self.started.send(payload.clone());
            self.gate
                .acquire()
                .await
                .map_err(|err| err.to_string())?
                .forget();
            Ok(())
        }
    }

    fn gated_writer(
        backlog: usize,
    ) -> (
        Arc<GatedSink>,
        mpsc::UnboundedReceiver<Bytes>,
        watch::Sender<Option<Bytes>>,
        CancellationToken,
    ) {
        let (started_tx, started_rx) = mpsc::unbounded_channel();
        let sink = Arc::new(GatedSink {
            started: started_tx,
            gate: Semaphore::new(0),
            backlog,
        });
        let (tx, rx) = watch::channel(None);
        let (events, _) = event_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(run_writer(Arc::clone(&sink), rx, events, 1024, cancel.clone()));
        (sink, started_rx, tx, cancel)
    }

    fn frame(tag: u8) -> Bytes {
        Bytes::from(vec![tag; 13])
    }

    #[test]
    fn ice_server_mapping() {
        let stun = to_rtc_ice_server(&IceServer::stun("stun:stun.example:3478"));
        assert_eq!(stun.urls, vec!["stun:stun.example:3478".to_string()]);
        assert!(stun.username.is_empty());
        assert!(stun.credential.is_empty());

        let turn = to_rtc_ice_server(&IceServer::turn("turn:relay:3478", "user", "pw"));
        assert_eq!(turn.username, "user");
        assert_eq!(turn.credential, "pw");
    }

    #[test]
    fn offer_is_not_an_answer() {
        let result = to_rtc_answer(SessionDescription::offer("v=0"));
        assert!(matches!(
            result,
            Err(TransportError::UnexpectedDescription {
                expected: SdpType::Answer,
                got: SdpType::Offer,
            })
        ));
    }

    #[test]
    fn submit_before_create_is_refused() {
        let backend = WebRtcBackend::new(ChannelConfig::default(), IceServer::defaults());
        assert!(!backend.try_submit(Bytes::from_static(&[0u8; 13])));
    }

    #[test]
    fn pranswer_is_not_an_answer() {
        let result = to_rtc_answer(SessionDescription {
            sdp_type: SdpType::Pranswer,
            sdp: "v=0".to_string(),
        });
        assert!(matches!(
            result,
            Err(TransportError::UnexpectedDescription {
                got: SdpType::Pranswer,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn stalled_writer_sends_latest_frame() {
        let (sink, mut started, tx, cancel) = gated_writer(0);

        tx.send_replace(Some(frame(1)));
        assert_eq!(started.recv().await.unwrap(), frame(1));

        // Writer is stuck on frame 1; each submit replaces the pending one.
        for tag in 2..=5 {
            tx.send_replace(Some(frame(tag)));
        }
        sink.gate.add_permits(10);

        assert_eq!(started.recv().await.unwrap(), frame(5));
        let idle = tokio::time::timeout(Duration::from_millis(50), started.recv()).await;
        assert!(idle.is_err(), "superseded frames must not be written");
        cancel.cancel();
    }

    #[tokio::test]
    async fn backlogged_writer_skips_frames() {
        let (sink, mut started, tx, cancel) = gated_writer(4096);
        sink.gate.add_permits(10);

        tx.send_replace(Some(frame(1)));
        let idle = tokio::time::timeout(Duration::from_millis(50), started.recv()).await;
        assert!(idle.is_err());
        cancel.cancel();
    }

    #[tokio::test]
    async fn answer_before_offer_is_rejected() {
        let mut backend = WebRtcBackend::new(ChannelConfig::default(), Vec::new());
        let result = backend
            .accept_answer(SessionDescription::answer("v=0"))
            .await;
        assert!(matches!(result, Err(TransportError::NotCreated)));
    }

    #[tokio::test]
    async fn close_without_create_is_noop() {
        let mut backend = WebRtcBackend::new(ChannelConfig::default(), Vec::new());
        backend.close().await.unwrap();
        backend.close().await.unwrap();
    }

    #[tokio::test]
    async fn offer_contains_data_channel() {
        let mut backend = WebRtcBackend::new(ChannelConfig::default(), Vec::new());
        let (tx, _rx) = event_channel();

        let offer = backend.create_offer(tx.clone()).await.unwrap();
        assert_eq!(offer.sdp_type, SdpType::Offer);
        assert!(offer.sdp.contains("m=application"));

        assert!(matches!(
            backend.create_offer(tx).await,
            Err(TransportError::AlreadyCreated)
        ));
        // Not open yet: nothing can be submitted.
        assert!(!backend.try_submit(Bytes::from_static(&[0u8; 13])));
        backend.close().await.unwrap();
    }
}
