//! Collaborators the snapshot talks to: where raw input comes from and where
//! warnings go.

use std::backtrace::Backtrace;
use tracing::warn;

/// Read access to the controllers attached to a driver station.
///
/// Ports are opaque identifiers; a port with nothing attached reports zero
/// buttons and zero axes.
pub trait DeviceQuery {
    /// Number of buttons the device on `port` exposes
    fn button_count(&self, port: u32) -> u32;

    /// Number of axes the device on `port` exposes
    fn axis_count(&self, port: u32) -> u32;

    /// Bitmask of currently pressed buttons, bit `n` for button `n`
    fn buttons(&self, port: u32) -> u32;

    /// Raw value of axis `index`, passed through untouched
    fn axis(&self, port: u32, index: u32) -> f64;

    /// Pump any pending input so the next reads are current.
    ///
    /// Called once per cycle by the poller before the snapshot samples.
    fn refresh(&mut self) {}
}

/// Sink for one-shot operator warnings
pub trait WarningReporter {
    fn report_warning(&mut self, message: &str, print_trace: bool);
}

/// Reports warnings through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl WarningReporter for TracingReporter {
    fn report_warning(&mut self, message: &str, print_trace: bool) {
        if print_trace {
            warn!("{}\n{}", message, Backtrace::force_capture());
        } else {
            warn!("{}", message);
        }
    }
}
