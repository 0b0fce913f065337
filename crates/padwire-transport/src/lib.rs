//! Channel backends for padwire.
//!
//! The channel carrying frames is always unordered with zero retransmits: a
//! late or lost frame is superseded by the next sample, so resending it would
//! only deliver stale state. Backends report their lifecycle as
//! [`ChannelEvent`]s and accept frames through a non-blocking submit.
//!
//! - [`ChannelBackend`] — the seam the session drives
//! - [`WebRtcBackend`] — WebRTC data channel implementation
//! - [`SessionDescription`] — the `{type, sdp}` payload exchanged during negotiation

pub mod backend;
pub mod config;
pub mod description;
pub mod error;
pub mod rtc;

pub use backend::{event_channel, ChannelBackend, ChannelEvent, EventReceiver, EventSender};
pub use config::{ChannelConfig, IceServer, MAX_RETRANSMITS, ORDERED};
pub use description::{SdpType, SessionDescription};
pub use error::{Result, TransportError};
pub use rtc::WebRtcBackend;
