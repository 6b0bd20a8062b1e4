//! Edge-aware state of a single boolean input.
//!
//! A [`ButtonState`] folds "is the input down right now" and "was it already
//! down last cycle" into one value, so callers can tell a fresh press from a
//! sustained hold without keeping any history of their own.

use serde::{Deserialize, Serialize};

/// Status of one button across a single update step
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonState {
    /// Went from up to down this cycle
    Pressed,
    /// Went from down to up this cycle
    Released,
    /// Was down and stays down
    HeldDown,
    /// Was up and stays up
    #[default]
    None,
}

impl ButtonState {
    /// Computes the next state from the previous one and the freshly sampled value.
    ///
    /// | previous          | current | result   |
    /// |-------------------|---------|----------|
    /// | Pressed, HeldDown | true    | HeldDown |
    /// | Released, None    | true    | Pressed  |
    /// | Released, None    | false   | None     |
    /// | Pressed, HeldDown | false   | Released |
    pub fn update(previous: ButtonState, current: bool) -> ButtonState {
        match (previous.is_down(), current) {
            (true, true) => ButtonState::HeldDown,
            (false, true) => ButtonState::Pressed,
            (false, false) => ButtonState::None,
            (true, false) => ButtonState::Released,
        }
    }

    /// Shorthand for `ButtonState::update(self, current)`
    pub fn next(self, current: bool) -> ButtonState {
        ButtonState::update(self, current)
    }

    /// The button is currently held (fresh press or sustained hold)
    pub fn is_down(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::HeldDown)
    }

    /// The button is currently released (fresh release or sustained idle)
    pub fn is_up(self) -> bool {
        !self.is_down()
    }

    /// The raw value flipped during the last update
    pub fn is_edge(self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Released)
    }
}
