//! Transport session for streaming controller frames.
//!
//! A [`TransportSession`] owns one channel for its whole life:
//!
//! ```text
//! Uninitialized ──► Negotiating ──► Open
//!                        │            │
//!                        ▼            ▼
//!                      Closed ◄───────┘
//! ```
//!
//! Negotiation is a single suspending call that relays the local offer
//! through a [`Signaling`] endpoint and waits for the channel to open.
//! After that, [`TransportSession::send_frame`] never waits: a frame is either
//! handed to the channel or dropped. `Closed` is terminal.

pub mod config;
pub mod error;
pub mod session;
pub mod signaling;
pub mod state;

pub use config::{SessionConfig, DEFAULT_SIGNALING_URL};
pub use error::{Result, SessionError};
pub use session::{SendOutcome, SessionStats, TransportSession, WebRtcSession};
pub use signaling::{HttpSignaling, Signaling};
pub use state::{SessionEvent, SessionState};
