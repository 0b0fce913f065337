//! Stream virtual game-controller state to a remote consumer.
//!
//! Controller samples are packed into a fixed 13-byte frame and offered to
//! an unordered, zero-retransmit channel. Lost or late frames are never
//! resent: the next sample supersedes them.
//!
//! # Crate Structure
//!
//! - [`frame`] — Controller state and the 13-byte wire frame
//! - [`transport`] — Channel backends (behind `session` feature)
//! - [`session`] — Session lifecycle and signaling (behind `session` feature)

/// Re-export frame types.
pub mod frame {
    pub use padwire_frame::*;
}

/// Re-export transport types (requires `session` feature).
#[cfg(feature = "session")]
pub mod transport {
    pub use padwire_transport::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use padwire_session::*;
}
