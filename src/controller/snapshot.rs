//! Latest known state of every input on one controller port.
//!
//! [`ControllerSnapshot::update`] is meant to run exactly once per control
//! cycle. Buttons go through [`ButtonState::update`]; axes are copied verbatim.
//! When the port does not report a full controller the snapshot keeps its last
//! values and a single warning is sent, then stays quiet until
//! [`ControllerSnapshot::reset`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::button_state::ButtonState;
use super::device::{DeviceQuery, WarningReporter};
use super::layout::{AxisType, ButtonType, MIN_AXIS_COUNT, MIN_BUTTON_COUNT};

/// Result of one update cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// All buttons and axes were refreshed
    Updated,
    /// The port did not report a full controller; nothing changed
    DeviceMissing,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    port: u32,
    buttons: [ButtonState; ButtonType::COUNT],
    axes: [f64; AxisType::COUNT],
    missing_reported: bool,
}

impl ControllerSnapshot {
    pub fn new(port: u32) -> Self {
        Self {
            port,
            buttons: [ButtonState::None; ButtonType::COUNT],
            axes: [0.0; AxisType::COUNT],
            missing_reported: false,
        }
    }

    /// Refresh every button and axis from `device`.
    ///
    /// If the port reports fewer than [`MIN_BUTTON_COUNT`] buttons or
    /// [`MIN_AXIS_COUNT`] axes, all fields keep their previous values and
    /// `reporter` is told once.
    pub fn update<D, R>(&mut self, device: &D, reporter: &mut R) -> UpdateOutcome
    where
        D: DeviceQuery + ?Sized,
        R: WarningReporter + ?Sized,
    {
        let button_count = device.button_count(self.port);
        let axis_count = device.axis_count(self.port);

        if button_count < MIN_BUTTON_COUNT || axis_count < MIN_AXIS_COUNT {
            debug!(
                "Port {} reports {} buttons and {} axes, skipping update",
                self.port, button_count, axis_count
            );
            if !self.missing_reported {
                self.missing_reported = true;
                reporter.report_warning(
                    &format!("The controller on port {} is not plugged in", self.port),
                    false,
                );
            }
            return UpdateOutcome::DeviceMissing;
        }

        let pressed = device.buttons(self.port);
        for button in ButtonType::ALL {
            let slot = &mut self.buttons[button.slot()];
            *slot = ButtonState::update(*slot, button.is_set(pressed));
        }

        for axis in AxisType::ALL {
            self.axes[axis.slot()] = device.axis(self.port, axis.index());
        }

        trace!("Port {} snapshot: {:?}", self.port, self);
        UpdateOutcome::Updated
    }

    /// Back to the freshly constructed state; the missing-device warning may fire again.
    pub fn reset(&mut self) {
        self.buttons = [ButtonState::None; ButtonType::COUNT];
        self.axes = [0.0; AxisType::COUNT];
        self.missing_reported = false;
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    pub fn button(&self, button: ButtonType) -> ButtonState {
        self.buttons[button.slot()]
    }

    pub fn axis(&self, axis: AxisType) -> f64 {
        self.axes[axis.slot()]
    }

    /// Buttons with their state, in bit order
    pub fn buttons(&self) -> impl Iterator<Item = (ButtonType, ButtonState)> + '_ {
        ButtonType::ALL
            .into_iter()
            .map(move |button| (button, self.button(button)))
    }

    /// Axes with their value, in device index order
    pub fn axes(&self) -> impl Iterator<Item = (AxisType, f64)> + '_ {
        AxisType::ALL
            .into_iter()
            .map(move |axis| (axis, self.axis(axis)))
    }

    /// Buttons whose state flipped during the last update
    pub fn edges(&self) -> impl Iterator<Item = (ButtonType, ButtonState)> + '_ {
        self.buttons().filter(|(_, state)| state.is_edge())
    }

    pub fn missing_reported(&self) -> bool {
        self.missing_reported
    }
}
