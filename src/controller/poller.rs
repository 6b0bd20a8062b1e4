//! Periodic driver for a [`ControllerSnapshot`].
//!
//! The poller is the single owner of the snapshot: it refreshes the device,
//! runs exactly one update per tick and hands out copies through a watch
//! channel, so readers never touch the live snapshot. Cycles that leave the
//! snapshot untouched publish nothing.

use chrono::Local;
use std::future::Future;
use tokio::sync::watch;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, error, info};

use super::device::{DeviceQuery, WarningReporter};
use super::snapshot::{ControllerSnapshot, UpdateOutcome};

// Poller settings
#[derive(Clone, Debug)]
pub struct PollerSettings {
    pub port: u32,
    pub cycle_interval_ms: u64,
    /// Stop with [`PollerError::NoReceivers`] once every subscriber is gone
    pub fail_without_receivers: bool,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            port: 0,
            cycle_interval_ms: 20,
            fail_without_receivers: false,
        }
    }
}

// Poller errors
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("Failed to initialize poller: {0}")]
    InitializationError(String),

    #[error("No receivers left for port {0}")]
    NoReceivers(u32),
}

pub struct ControllerPoller<D, R> {
    device: D,
    reporter: R,
    settings: PollerSettings,

    // Owned snapshot, mutated only by cycle() and reset()
    snapshot: ControllerSnapshot,

    // Watch channel sender
    state_sender: watch::Sender<ControllerSnapshot>,
}

impl<D: DeviceQuery, R: WarningReporter> ControllerPoller<D, R> {
    pub fn create(
        device: D,
        reporter: R,
        settings: Option<PollerSettings>,
    ) -> Result<Self, PollerError> {
        let settings = settings.unwrap_or_default();
        info!("Creating controller poller with settings: {:?}", settings);

        if settings.cycle_interval_ms == 0 {
            return Err(PollerError::InitializationError(
                "cycle interval must be at least 1 ms".to_string(),
            ));
        }

        let snapshot = ControllerSnapshot::new(settings.port);
        let (state_sender, _) = watch::channel(snapshot.clone());
        debug!("Created watch channel for snapshot broadcasts");

        Ok(Self {
            device,
            reporter,
            settings,
            snapshot,
            state_sender,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.state_sender.subscribe()
    }

    pub fn snapshot(&self) -> &ControllerSnapshot {
        &self.snapshot
    }

    pub fn settings(&self) -> &PollerSettings {
        &self.settings
    }

    /// Run one control cycle, publishing the snapshot if it was refreshed.
    ///
    /// With `fail_without_receivers` set, a poller nobody listens to fails
    /// before touching the device.
    pub fn cycle(&mut self) -> Result<UpdateOutcome, PollerError> {
        if self.settings.fail_without_receivers && self.state_sender.receiver_count() == 0 {
            error!("Port {} has no snapshot receivers left", self.settings.port);
            return Err(PollerError::NoReceivers(self.settings.port));
        }

        self.device.refresh();
        let outcome = self.snapshot.update(&self.device, &mut self.reporter);

        if outcome == UpdateOutcome::Updated {
            for (button, state) in self.snapshot.edges() {
                debug!("Port {}: {:?} {:?}", self.settings.port, button, state);
            }
            self.state_sender.send_replace(self.snapshot.clone());
        }

        Ok(outcome)
    }

    pub fn reset(&mut self) {
        info!("Resetting snapshot for port {}", self.settings.port);
        self.snapshot.reset();
        self.state_sender.send_replace(self.snapshot.clone());
    }

    /// Cycle once per interval tick until `shutdown` completes or a cycle fails
    pub async fn run<F>(&mut self, shutdown: F) -> Result<(), PollerError>
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting poller loop on port {} with {}ms interval",
            self.settings.port, self.settings.cycle_interval_ms
        );

        let mut interval_timer =
            tokio::time::interval(Duration::from_millis(self.settings.cycle_interval_ms));
        interval_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        // Stats for performance monitoring
        let mut cycles: u64 = 0;
        let mut missing: u64 = 0;
        let mut last_stats_time = Local::now();
        let stats_interval = chrono::Duration::seconds(30);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, leaving poller loop");
                    return Ok(());
                }
                _ = interval_timer.tick() => {}
            }

            if self.cycle()? == UpdateOutcome::DeviceMissing {
                missing += 1;
            }
            cycles += 1;

            let now = Local::now();
            if now - last_stats_time > stats_interval {
                info!(
                    "Poller stats: {} cycles, {} without a controller in {} seconds",
                    cycles,
                    missing,
                    (now - last_stats_time).num_seconds()
                );
                cycles = 0;
                missing = 0;
                last_stats_time = now;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::button_state::ButtonState;
    use crate::controller::layout::{AxisType, ButtonType, MIN_AXIS_COUNT, MIN_BUTTON_COUNT};
    use std::cell::Cell;
    use std::rc::Rc;

    // Plays back one pressed-buttons mask per refresh
    struct ScriptedDevice {
        script: Vec<u32>,
        refreshes: Rc<Cell<usize>>,
        connected: Rc<Cell<bool>>,
    }

    impl ScriptedDevice {
        fn new(script: Vec<u32>) -> Self {
            Self {
                script,
                refreshes: Rc::new(Cell::new(0)),
                connected: Rc::new(Cell::new(true)),
            }
        }

        fn current(&self) -> u32 {
            let step = self.refreshes.get().saturating_sub(1);
            self.script
                .get(step)
                .or(self.script.last())
                .copied()
                .unwrap_or(0)
        }
    }

    impl DeviceQuery for ScriptedDevice {
        fn button_count(&self, _port: u32) -> u32 {
            if self.connected.get() {
                MIN_BUTTON_COUNT
            } else {
                0
            }
        }

        fn axis_count(&self, _port: u32) -> u32 {
            if self.connected.get() {
                MIN_AXIS_COUNT
            } else {
                0
            }
        }

        fn buttons(&self, _port: u32) -> u32 {
            self.current()
        }

        fn axis(&self, _port: u32, index: u32) -> f64 {
            f64::from(index) / 10.0
        }

        fn refresh(&mut self) {
            self.refreshes.set(self.refreshes.get() + 1);
        }
    }

    #[derive(Default)]
    struct CountingReporter {
        count: usize,
    }

    impl WarningReporter for CountingReporter {
        fn report_warning(&mut self, _message: &str, _print_trace: bool) {
            self.count += 1;
        }
    }

    fn settings(port: u32, cycle_interval_ms: u64) -> PollerSettings {
        PollerSettings {
            port,
            cycle_interval_ms,
            ..Default::default()
        }
    }

    #[test]
    fn zero_interval_is_rejected() {
        let result = ControllerPoller::create(
            ScriptedDevice::new(vec![]),
            CountingReporter::default(),
            Some(settings(0, 0)),
        );
        assert!(matches!(result, Err(PollerError::InitializationError(_))));
    }

    #[test]
    fn cycle_refreshes_then_updates_then_publishes() {
        let device = ScriptedDevice::new(vec![ButtonType::Start.mask(), 0]);
        let refreshes = device.refreshes.clone();
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), None).unwrap();
        let mut rx = poller.subscribe();

        assert_eq!(poller.cycle().unwrap(), UpdateOutcome::Updated);
        assert_eq!(refreshes.get(), 1);
        assert!(rx.has_changed().unwrap());
        let published = rx.borrow_and_update().clone();
        assert_eq!(published.button(ButtonType::Start), ButtonState::Pressed);
        assert_eq!(published.axis(AxisType::RightY), 0.5);

        poller.cycle().unwrap();
        assert_eq!(refreshes.get(), 2);
        assert_eq!(
            rx.borrow_and_update().button(ButtonType::Start),
            ButtonState::Released
        );
    }

    #[test]
    fn missing_device_cycles_warn_once() {
        let device = ScriptedDevice::new(vec![]);
        device.connected.set(false);
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), None).unwrap();

        for _ in 0..4 {
            assert_eq!(poller.cycle().unwrap(), UpdateOutcome::DeviceMissing);
        }
        assert_eq!(poller.reporter.count, 1);

        poller.reset();
        poller.cycle().unwrap();
        assert_eq!(poller.reporter.count, 2);
    }

    #[test]
    fn missing_cycles_do_not_republish_stale_edges() {
        let device = ScriptedDevice::new(vec![ButtonType::A.mask()]);
        let connected = device.connected.clone();
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), None).unwrap();
        let mut rx = poller.subscribe();

        poller.cycle().unwrap();
        assert_eq!(
            rx.borrow_and_update().button(ButtonType::A),
            ButtonState::Pressed
        );

        connected.set(false);
        let mut stale_edges = 0;
        for _ in 0..3 {
            assert_eq!(poller.cycle().unwrap(), UpdateOutcome::DeviceMissing);
            if rx.has_changed().unwrap() {
                stale_edges += rx.borrow_and_update().edges().count();
            }
        }

        assert!(!rx.has_changed().unwrap());
        assert_eq!(stale_edges, 0);
    }

    #[test]
    fn reset_publishes_idle_snapshot() {
        let device = ScriptedDevice::new(vec![ButtonType::A.mask()]);
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), Some(settings(4, 5)))
                .unwrap();
        let mut rx = poller.subscribe();

        poller.cycle().unwrap();
        poller.reset();

        assert_eq!(*rx.borrow_and_update(), ControllerSnapshot::new(4));
    }

    #[test]
    fn cycle_fails_once_receivers_are_gone() {
        let device = ScriptedDevice::new(vec![ButtonType::B.mask()]);
        let refreshes = device.refreshes.clone();
        let strict = PollerSettings {
            fail_without_receivers: true,
            ..Default::default()
        };
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), Some(strict)).unwrap();

        let rx = poller.subscribe();
        assert_eq!(poller.cycle().unwrap(), UpdateOutcome::Updated);
        drop(rx);

        assert!(matches!(poller.cycle(), Err(PollerError::NoReceivers(0))));
        // the device is not sampled once the poller gives up
        assert_eq!(refreshes.get(), 1);
        assert_eq!(poller.snapshot().button(ButtonType::B), ButtonState::Pressed);
    }

    #[test]
    fn lenient_poller_keeps_cycling_without_receivers() {
        let device = ScriptedDevice::new(vec![ButtonType::B.mask()]);
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), None).unwrap();

        assert_eq!(poller.cycle().unwrap(), UpdateOutcome::Updated);
        assert_eq!(poller.cycle().unwrap(), UpdateOutcome::Updated);
        assert_eq!(poller.snapshot().button(ButtonType::B), ButtonState::HeldDown);
    }

    #[tokio::test]
    async fn run_cycles_until_shutdown() {
        let device = ScriptedDevice::new(vec![ButtonType::X.mask()]);
        let refreshes = device.refreshes.clone();
        let mut poller =
            ControllerPoller::create(device, CountingReporter::default(), Some(settings(0, 1)))
                .unwrap();
        let mut rx = poller.subscribe();

        poller
            .run(async move {
                for _ in 0..3 {
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
            })
            .await
            .unwrap();

        assert!(refreshes.get() >= 3);
        assert_eq!(poller.snapshot().button(ButtonType::X), ButtonState::HeldDown);
    }

    #[tokio::test]
    async fn run_stops_when_nobody_listens() {
        let strict = PollerSettings {
            cycle_interval_ms: 1,
            fail_without_receivers: true,
            ..Default::default()
        };
        let mut poller = ControllerPoller::create(
            ScriptedDevice::new(vec![]),
            CountingReporter::default(),
            Some(strict),
        )
        .unwrap();

        let result = poller.run(std::future::pending()).await;
        assert!(matches!(result, Err(PollerError::NoReceivers(0))));
    }
}
