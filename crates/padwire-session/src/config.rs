use std::time::Duration;

use padwire_transport::{ChannelConfig, IceServer};

/// Signaling endpoint used when none is configured.
pub const DEFAULT_SIGNALING_URL: &str = "http://127.0.0.1:8000/webrtc/offer";

/// Configuration for a WebRTC-backed session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// URL the offer is POSTed to.
    pub signaling_url: String,
    /// Per-request timeout for the signaling HTTP client.
    ///
    /// `None` leaves the request unbounded; the session itself never times
    /// out negotiation.
    pub signaling_timeout: Option<Duration>,
    /// STUN/TURN servers.
    pub ice_servers: Vec<IceServer>,
    /// Frame channel settings.
    pub channel: ChannelConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_string(),
            signaling_timeout: None,
            ice_servers: IceServer::defaults(),
            channel: ChannelConfig::default(),
        }
    }
}
