//! Controller state snapshot fed to the encoder.

use bitflags::bitflags;

bitflags! {
    /// The 16 digital buttons. Bit positions are the wire positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct Buttons: u16 {
        const A = 1 << 0;
        const B = 1 << 1;
        const X = 1 << 2;
        const Y = 1 << 3;

        const DPAD_UP = 1 << 4;
        const DPAD_DOWN = 1 << 5;
        const DPAD_LEFT = 1 << 6;
        const DPAD_RIGHT = 1 << 7;

        const L = 1 << 8;
        const R = 1 << 9;
        const ZL = 1 << 10;
        const ZR = 1 << 11;

        const PLUS = 1 << 12;
        const MINUS = 1 << 13;
        const HOME = 1 << 14;
        const CAPTURE = 1 << 15;
    }
}

bitflags! {
    /// Side-rail buttons exposed by a detached left or right grip.
    ///
    /// Only the low nibble is defined; bits 4-7 are reserved and always
    /// encoded as zero.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct GripButtons: u8 {
        const LEFT_SR = 1 << 0;
        const LEFT_SL = 1 << 1;
        const RIGHT_SR = 1 << 2;
        const RIGHT_SL = 1 << 3;
    }
}

impl Default for Buttons {
    fn default() -> Self {
        Self::empty()
    }
}

impl Default for GripButtons {
    fn default() -> Self {
        Self::empty()
    }
}

/// One analog stick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StickState {
    /// The stick is clicked in.
    pub pressed: bool,
    /// Horizontal axis.
    pub x: i16,
    /// Vertical axis.
    pub y: i16,
}

impl StickState {
    /// Centered, not pressed.
    pub const NEUTRAL: Self = Self {
        pressed: false,
        x: 0,
        y: 0,
    };

    /// A deflected stick that is not pressed.
    pub const fn at(x: i16, y: i16) -> Self {
        Self {
            pressed: false,
            x,
            y,
        }
    }
}

/// A complete controller snapshot for one sample.
///
/// There is no delta model: every encode takes the whole state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControllerState {
    pub buttons: Buttons,
    pub grips: GripButtons,
    pub left_stick: StickState,
    pub right_stick: StickState,
}

impl ControllerState {
    /// Nothing pressed, both sticks centered.
    pub const fn neutral() -> Self {
        Self {
            buttons: Buttons::empty(),
            grips: GripButtons::empty(),
            left_stick: StickState::NEUTRAL,
            right_stick: StickState::NEUTRAL,
        }
    }

    /// Return a copy with `buttons` held.
    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons |= buttons;
        self
    }

    /// Return a copy with `grips` held.
    pub fn with_grips(mut self, grips: GripButtons) -> Self {
        self.grips |= grips;
        self
    }

    /// Return a copy with the left stick replaced.
    pub fn with_left_stick(mut self, stick: StickState) -> Self {
        self.left_stick = stick;
        self
    }

    /// Return a copy with the right stick replaced.
    pub fn with_right_stick(mut self, stick: StickState) -> Self {
        self.right_stick = stick;
        self
    }

    /// Stick-press bitmask as it appears on the wire (bit 0 left, bit 1 right).
    pub fn stick_press_bits(&self) -> u8 {
        u8::from(self.left_stick.pressed) | (u8::from(self.right_stick.pressed) << 1)
    }
}
