//! Controller subsystem for per-cycle gamepad input
//!
//! 1. [`button_state`] - four-state edge detector for a single button
//! 2. [`snapshot`] - latest state of every button and axis on one port
//! 3. [`poller`] - drives one snapshot update per control cycle
//!
//! # Architecture
//!
//! ```text
//! DeviceQuery ──► ControllerSnapshot::update ──► watch::Receiver<ControllerSnapshot>
//!                 (once per tick)                 (readers)
//! ```

pub mod button_state;
pub mod device;
pub mod gilrs_device;
pub mod layout;
pub mod poller;
pub mod snapshot;

pub use button_state::ButtonState;
pub use device::{DeviceQuery, TracingReporter, WarningReporter};
pub use gilrs_device::{DeviceError, GilrsDevice};
pub use layout::{AxisType, ButtonType, MIN_AXIS_COUNT, MIN_BUTTON_COUNT};
pub use poller::{ControllerPoller, PollerError, PollerSettings};
pub use snapshot::{ControllerSnapshot, UpdateOutcome};
