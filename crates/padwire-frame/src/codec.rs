use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::state::{Buttons, ControllerState, GripButtons, StickState};

/// Encoded frame size: slot (1) + buttons (2) + grips (1) + stick press (1) + 4 axes (8).
pub const FRAME_LEN: usize = 13;

/// Stick-press bitmask: left stick clicked.
pub const STICK_LEFT_PRESSED: u8 = 1 << 0;

/// Stick-press bitmask: right stick clicked.
pub const STICK_RIGHT_PRESSED: u8 = 1 << 1;

/// One encoded controller sample.
///
/// Frames have no identity beyond their bytes. They are built fresh for
/// every sample and handed straight to the transport.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    /// The raw wire bytes.
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Copy the frame into a `Bytes` for submission to a channel.
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0)
    }

    /// The controller slot this frame addresses.
    pub fn slot(&self) -> u8 {
        self.0[0]
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Frame> for [u8; FRAME_LEN] {
    fn from(frame: Frame) -> Self {
        frame.0
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame(")?;
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        write!(f, ")")
    }
}

/// Encode a controller sample into the wire format.
///
/// Wire format (all multi-byte fields little-endian):
/// ```text
/// ┌──────┬─────────┬───────┬───────┬──────┬──────┬──────┬──────┐
/// │ Slot │ Buttons │ Grips │ Press │ LX   │ LY   │ RX   │ RY   │
/// │ u8   │ u16     │ u8    │ u8    │ i16  │ i16  │ i16  │ i16  │
/// └──────┴─────────┴───────┴───────┴──────┴──────┴──────┴──────┘
///  0      1         3       4       5      7      9      11
/// ```
///
/// The slot index keeps only its low 8 bits. Reserved bits in the grip and
/// stick-press fields are always zero. Never fails.
pub fn encode_frame(slot: usize, state: &ControllerState) -> Frame {
    let mut buf = [0u8; FRAME_LEN];
    let mut dst = &mut buf[..];

    dst.put_u8((slot & 0xFF) as u8);
    dst.put_u16_le(state.buttons.bits());
    dst.put_u8(state.grips.bits() & GripButtons::all().bits());
    dst.put_u8(state.stick_press_bits());
    dst.put_i16_le(state.left_stick.x);
    dst.put_i16_le(state.left_stick.y);
    dst.put_i16_le(state.right_stick.x);
    dst.put_i16_le(state.right_stick.y);
    debug_assert!(dst.is_empty());

    Frame(buf)
}

/// Encode a controller sample and append it to `dst`.
pub fn encode_frame_into(slot: usize, state: &ControllerState, dst: &mut BytesMut) {
    dst.reserve(FRAME_LEN);
    dst.put_slice(encode_frame(slot, state).as_bytes());
}

/// Decode a frame back into its slot index and controller state.
///
/// This is what the remote consumer does with every datagram. Trailing bytes
/// past [`FRAME_LEN`] are ignored, as are reserved bits.
pub fn decode_frame(src: &[u8]) -> Result<(u8, ControllerState)> {
    if src.len() < FRAME_LEN {
        return Err(FrameError::TooShort {
            len: src.len(),
            need: FRAME_LEN,
        });
    }

    let mut src = &src[..FRAME_LEN];
    let slot = src.get_u8();
    let buttons = Buttons::from_bits_retain(src.get_u16_le());
    let grips = GripButtons::from_bits_truncate(src.get_u8());
    let press = src.get_u8();
    let (lx, ly) = (src.get_i16_le(), src.get_i16_le());
    let (rx, ry) = (src.get_i16_le(), src.get_i16_le());

    let state = ControllerState {
        buttons,
        grips,
        left_stick: StickState {
            pressed: press & STICK_LEFT_PRESSED != 0,
            x: lx,
            y: ly,
        },
        right_stick: StickState {
            pressed: press & STICK_RIGHT_PRESSED != 0,
            x: rx,
            y: ry,
        },
    };
    Ok((slot, state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_state_is_all_zero_after_slot() {
        let frame = encode_frame(7, &ControllerState::neutral());
        assert_eq!(frame.as_bytes(), &[7, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(frame.slot(), 7);
    }

    #[test]
    fn a_and_dpad_up_with_left_stick() {
        let state = ControllerState::neutral()
            .with_buttons(Buttons::A | Buttons::DPAD_UP)
            .with_left_stick(StickState::at(100, -100));

        let frame = encode_frame(3, &state);
        assert_eq!(
            frame.as_bytes(),
            &[3, 0x11, 0x00, 0x00, 0x00, 100, 0, 156, 255, 0, 0, 0, 0]
        );
    }

    #[test]
    fn each_button_sets_its_own_bit() {
        for bit in 0..16u16 {
            let button = Buttons::from_bits_retain(1 << bit);
            let frame = encode_frame(0, &ControllerState::neutral().with_buttons(button));
            let bytes = frame.as_bytes();

            assert_eq!(u16::from_le_bytes([bytes[1], bytes[2]]), 1 << bit);
            assert!(bytes[3..].iter().all(|b| *b == 0), "bit {bit}: {frame:?}");
            assert_eq!(bytes[0], 0);
        }
    }

    #[test]
    fn each_grip_sets_its_own_bit() {
        let grips = [
            GripButtons::LEFT_SR,
            GripButtons::LEFT_SL,
            GripButtons::RIGHT_SR,
            GripButtons::RIGHT_SL,
        ];
        for (bit, grip) in grips.into_iter().enumerate() {
            let frame = encode_frame(0, &ControllerState::neutral().with_grips(grip));
            assert_eq!(frame.as_bytes()[3], 1 << bit);
        }
    }

    #[test]
    fn reserved_grip_bits_are_cleared() {
        let state = ControllerState {
            grips: GripButtons::from_bits_retain(0xF5),
            ..ControllerState::neutral()
        };
        assert_eq!(encode_frame(0, &state).as_bytes()[3], 0x05);
    }

    #[test]
    fn stick_press_field() {
        let mut state = ControllerState::neutral();
        state.right_stick.pressed = true;
        assert_eq!(encode_frame(0, &state).as_bytes()[4], STICK_RIGHT_PRESSED);

        state.left_stick.pressed = true;
        assert_eq!(
            encode_frame(0, &state).as_bytes()[4],
            STICK_LEFT_PRESSED | STICK_RIGHT_PRESSED
        );
    }

    #[test]
    fn axis_extremes_survive_decode() {
        let state = ControllerState::neutral()
            .with_left_stick(StickState::at(i16::MIN, i16::MAX))
            .with_right_stick(StickState::at(i16::MAX, i16::MIN));

        let frame = encode_frame(0, &state);
        assert_eq!(&frame.as_bytes()[5..9], &[0x00, 0x80, 0xFF, 0x7F]);
        assert_eq!(&frame.as_bytes()[9..13], &[0xFF, 0x7F, 0x00, 0x80]);

        let (_, decoded) = decode_frame(frame.as_ref()).unwrap();
        assert_eq!(decoded.left_stick.x, -32768);
        assert_eq!(decoded.left_stick.y, 32767);
        assert_eq!(decoded.right_stick.x, 32767);
        assert_eq!(decoded.right_stick.y, -32768);
    }

    #[test]
    fn slot_keeps_low_byte() {
        let state = ControllerState::neutral().with_buttons(Buttons::HOME);
        assert_eq!(encode_frame(256, &state), encode_frame(0, &state));
        assert_eq!(encode_frame(0x1FF, &state).slot(), 0xFF);
        assert_eq!(encode_frame(255, &state).slot(), 255);
    }

    #[test]
    fn encode_into_appends() {
        let mut buf = BytesMut::from(&b"xy"[..]);
        let state = ControllerState::neutral().with_buttons(Buttons::CAPTURE);

        encode_frame_into(1, &state, &mut buf);

        assert_eq!(buf.len(), 2 + FRAME_LEN);
        assert_eq!(&buf[..2], b"xy");
        assert_eq!(&buf[2..], encode_frame(1, &state).as_ref());
    }

    #[test]
    fn decode_ignores_reserved_bits_and_trailing_bytes() {
        let mut raw = encode_frame(9, &ControllerState::neutral()).as_bytes().to_vec();
        raw[3] = 0xF2;
        raw[4] = 0xFD;
        raw.extend_from_slice(&[0xAA, 0xBB]);

        let (slot, state) = decode_frame(&raw).unwrap();
        assert_eq!(slot, 9);
        assert_eq!(state.grips, GripButtons::LEFT_SL);
        assert!(state.left_stick.pressed);
        assert!(!state.right_stick.pressed);
    }

    #[test]
    fn decode_short_buffer() {
        let result = decode_frame(&[0u8; FRAME_LEN - 1]);
        assert_eq!(
            result,
            Err(FrameError::TooShort {
                len: FRAME_LEN - 1,
                need: FRAME_LEN,
            })
        );
    }

    #[test]
    fn debug_shows_hex() {
        let frame = encode_frame(0x10, &ControllerState::neutral().with_buttons(Buttons::B));
        assert_eq!(
            format!("{frame:?}"),
            "Frame(10 02 00 00 00 00 00 00 00 00 00 00 00)"
        );
    }
}
