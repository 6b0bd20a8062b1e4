//! [`DeviceQuery`] backed by gilrs.
//!
//! A port is the numeric gilrs [`GamepadId`](gilrs::GamepadId). Unplugging a
//! pad leaves its port empty rather than shifting the other pads down.
//!
//! gilrs only updates its cached gamepad state while events are being drained,
//! so [`GilrsDevice::refresh`] has to run before every sample.

use gilrs::{Axis, Button, Event, EventType, Gamepad, Gilrs};
use tracing::{debug, error, info, warn};

use super::device::DeviceQuery;
use super::layout::{AxisType, ButtonType, MIN_AXIS_COUNT, MIN_BUTTON_COUNT};

// Device errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Failed to initialize gilrs: {0}")]
    InitializationError(String),
}

pub struct GilrsDevice {
    gilrs: Gilrs,
}

impl GilrsDevice {
    pub fn create() -> Result<Self, DeviceError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(DeviceError::InitializationError(e.to_string()));
            }
        };

        let device = Self { gilrs };
        device.log_gamepads();
        Ok(device)
    }

    fn log_gamepads(&self) {
        let mut found = 0;
        for (id, gamepad) in self.gilrs.gamepads() {
            let port = usize::from(id);
            info!(
                "  [port {}] ID: {}, Name: {}, UUID: {:?}",
                port,
                id,
                gamepad.name(),
                gamepad.uuid()
            );
            found += 1;
        }
        if found == 0 {
            warn!("No gamepad connected, ports will report as missing");
        }
    }

    fn gamepad(&self, port: u32) -> Option<Gamepad<'_>> {
        find_port(
            port,
            self.gilrs
                .gamepads()
                .map(|(id, gamepad)| (usize::from(id), gamepad)),
        )
    }
}

impl DeviceQuery for GilrsDevice {
    fn button_count(&self, port: u32) -> u32 {
        match self.gamepad(port) {
            Some(gamepad) if gamepad.is_connected() => MIN_BUTTON_COUNT,
            _ => 0,
        }
    }

    fn axis_count(&self, port: u32) -> u32 {
        match self.gamepad(port) {
            Some(gamepad) if gamepad.is_connected() => MIN_AXIS_COUNT,
            _ => 0,
        }
    }

    fn buttons(&self, port: u32) -> u32 {
        let Some(gamepad) = self.gamepad(port) else {
            return 0;
        };
        ButtonType::ALL
            .into_iter()
            .filter(|button| gamepad.is_pressed(map_button(*button)))
            .fold(0, |mask, button| mask | button.mask())
    }

    fn axis(&self, port: u32, index: u32) -> f64 {
        let (Some(gamepad), Some(axis)) = (self.gamepad(port), AxisType::from_index(index)) else {
            return 0.0;
        };
        let value = match axis {
            AxisType::LeftX => gamepad.value(Axis::LeftStickX),
            AxisType::LeftY => gamepad.value(Axis::LeftStickY),
            AxisType::RightX => gamepad.value(Axis::RightStickX),
            AxisType::RightY => gamepad.value(Axis::RightStickY),
            AxisType::LeftTrigger => trigger_value(&gamepad, Button::LeftTrigger2, Axis::LeftZ),
            AxisType::RightTrigger => trigger_value(&gamepad, Button::RightTrigger2, Axis::RightZ),
        };
        f64::from(value)
    }

    fn refresh(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => info!("Controller {} connected", id),
                EventType::Disconnected => warn!("Controller {} disconnected", id),
                _ => debug!("Drained gilrs event {:?} from {}", event, id),
            }
        }
    }
}

// Picks the pad whose id is `port`, never a neighbour
fn find_port<T>(port: u32, pads: impl IntoIterator<Item = (usize, T)>) -> Option<T> {
    pads.into_iter()
        .find(|(id, _)| *id == port as usize)
        .map(|(_, pad)| pad)
}

// Maps our button layout onto gilrs' positional buttons
fn map_button(button: ButtonType) -> Button {
    match button {
        ButtonType::A => Button::South,
        ButtonType::B => Button::East,
        ButtonType::X => Button::West,
        ButtonType::Y => Button::North,
        ButtonType::LeftBumper => Button::LeftTrigger,
        ButtonType::RightBumper => Button::RightTrigger,
        ButtonType::Back => Button::Select,
        ButtonType::Start => Button::Start,
        ButtonType::LeftStick => Button::LeftThumb,
        ButtonType::RightStick => Button::RightThumb,
    }
}

// Analog triggers show up as buttons with a value on most mappings, as Z axes on the rest
fn trigger_value(gamepad: &Gamepad<'_>, button: Button, fallback: Axis) -> f32 {
    gamepad
        .button_data(button)
        .map(|data| data.value())
        .unwrap_or_else(|| gamepad.value(fallback))
}
