//! Fixed-size wire frame for virtual game-controller state.
//!
//! Every sample of controller state is packed into exactly 13 bytes:
//! - a 1-byte controller slot index
//! - a 2-byte little-endian button bitmask
//! - a 1-byte grip-rail bitmask and a 1-byte stick-press bitmask
//! - four little-endian signed 16-bit stick axes
//!
//! Encoding is a pure function of `(slot, state)`. There is no version
//! field and no sequence number: the newest frame always wins.

pub mod codec;
pub mod error;
pub mod state;

pub use codec::{decode_frame, encode_frame, encode_frame_into, Frame, FRAME_LEN};
pub use error::{FrameError, Result};
pub use state::{Buttons, ControllerState, GripButtons, StickState};
