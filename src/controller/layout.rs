//! Fixed input layout of an Xbox-style controller as reported by the device API.
//!
//! Buttons arrive as one bitmask per port and axes as indexed values; the enums
//! here pin every physical input to its bit or index.

use serde::{Deserialize, Serialize};

/// Buttons required before a device counts as present
pub const MIN_BUTTON_COUNT: u32 = 10;

/// Axes required before a device counts as present
pub const MIN_AXIS_COUNT: u32 = 6;

// Button type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonType {
    A,
    B,
    X,
    Y,
    LeftBumper,
    RightBumper,
    Back,
    Start,
    LeftStick,
    RightStick,
}

impl ButtonType {
    pub const COUNT: usize = 10;

    /// Every button, ordered by bit
    pub const ALL: [ButtonType; ButtonType::COUNT] = [
        ButtonType::A,
        ButtonType::B,
        ButtonType::X,
        ButtonType::Y,
        ButtonType::LeftBumper,
        ButtonType::RightBumper,
        ButtonType::Back,
        ButtonType::Start,
        ButtonType::LeftStick,
        ButtonType::RightStick,
    ];

    /// Bit position in the device's pressed-buttons mask
    pub const fn bit(self) -> u32 {
        match self {
            ButtonType::A => 0,
            ButtonType::B => 1,
            ButtonType::X => 2,
            ButtonType::Y => 3,
            ButtonType::LeftBumper => 4,
            ButtonType::RightBumper => 5,
            ButtonType::Back => 6,
            ButtonType::Start => 7,
            ButtonType::LeftStick => 8,
            ButtonType::RightStick => 9,
        }
    }

    pub const fn mask(self) -> u32 {
        1 << self.bit()
    }

    /// Whether this button is set in a pressed-buttons mask
    pub const fn is_set(self, buttons: u32) -> bool {
        buttons & self.mask() != 0
    }

    pub(crate) const fn slot(self) -> usize {
        self.bit() as usize
    }
}

// Axis type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisType {
    LeftX,
    RightX,
    LeftTrigger,
    RightTrigger,
    LeftY,
    RightY,
}

impl AxisType {
    pub const COUNT: usize = 6;

    /// Every axis, ordered by device index
    pub const ALL: [AxisType; AxisType::COUNT] = [
        AxisType::LeftX,
        AxisType::RightX,
        AxisType::LeftTrigger,
        AxisType::RightTrigger,
        AxisType::LeftY,
        AxisType::RightY,
    ];

    /// Index passed to the device when reading this axis
    pub const fn index(self) -> u32 {
        match self {
            AxisType::LeftX => 0,
            AxisType::RightX => 1,
            AxisType::LeftTrigger => 2,
            AxisType::RightTrigger => 3,
            AxisType::LeftY => 4,
            AxisType::RightY => 5,
        }
    }

    pub fn from_index(index: u32) -> Option<AxisType> {
        AxisType::ALL.into_iter().find(|axis| axis.index() == index)
    }

    /// Triggers rest at 0.0 and travel to 1.0; sticks span -1.0..=1.0
    pub const fn is_trigger(self) -> bool {
        matches!(self, AxisType::LeftTrigger | AxisType::RightTrigger)
    }

    pub(crate) const fn slot(self) -> usize {
        self.index() as usize
    }
}
