//! Deterministic playback of recorded traffic scenarios.
//!
//! A scenario is a YAML file naming an interface and listing the
//! packets to emit, in order, with a fixed inter-packet gap. Replays of
//! the same scenario deliver identical event sequences, which makes
//! full-pipeline behavior reproducible from a checked-in file.

use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use netpulse_config::{CaptureConfig, ConfigError};
use netpulse_core::{Event, EventBus, PacketRecord};

use crate::worker::{sleep_unless_stopped, CaptureWorker};
use crate::{CaptureError, CaptureSource};

/// A recorded traffic scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Interface name the scenario pretends to capture on.
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Gap between consecutive packets, milliseconds.
    #[serde(default)]
    pub interval_ms: u64,

    /// Packets emitted in listed order.
    pub packets: Vec<PacketRecord>,
}

fn default_interface() -> String {
    "replay0".to_string()
}

/// Capture source replaying a [`Scenario`] on a background thread.
///
/// The worker finishes on its own once the last packet is emitted;
/// `stop` before that point cuts the replay short.
pub struct ReplaySource {
    bus: Arc<EventBus>,
    scenario: Scenario,
    worker: Mutex<Option<CaptureWorker>>,
}

impl ReplaySource {
    pub fn new(scenario: Scenario, bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            scenario,
            worker: Mutex::new(None),
        }
    }

    /// Load a scenario from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P, bus: Arc<EventBus>) -> Result<Self, CaptureError> {
        let text = fs::read_to_string(path.as_ref())?;
        let scenario: Scenario = serde_yaml::from_str(&text)?;
        info!(
            "Loaded scenario from {:?}: {} packets on '{}'",
            path.as_ref(),
            scenario.packets.len(),
            scenario.interface
        );
        Ok(Self::new(scenario, bus))
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }
}

impl CaptureSource for ReplaySource {
    fn start(&self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config.validate().map_err(ConfigError::from)?;

        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(|w| !w.is_finished()) {
            debug!("Replay already running; start ignored");
            return Ok(());
        }

        if let Some(requested) = &config.interface {
            if requested != &self.scenario.interface {
                return Err(CaptureError::InterfaceUnavailable(requested.clone()));
            }
        }

        let bus = Arc::clone(&self.bus);
        let scenario = self.scenario.clone();
        info!(
            "Replaying {} packets on '{}'",
            scenario.packets.len(),
            scenario.interface
        );
        *worker = Some(CaptureWorker::spawn("netpulse-replay", move |stop| {
            let interval = Duration::from_millis(scenario.interval_ms);
            for record in scenario.packets {
                bus.publish(&Event::PacketCaptured(record));
                let keep_going = if interval.is_zero() {
                    !stop.load(Ordering::Relaxed)
                } else {
                    sleep_unless_stopped(&stop, interval)
                };
                if !keep_going {
                    debug!("Replay stopped before scenario end");
                    return;
                }
            }
            debug!("Replay finished");
        })?);
        Ok(())
    }

    fn stop(&self, grace: Duration) {
        let worker = self.worker.lock().take();
        match worker {
            Some(worker) => worker.stop(grace),
            None => debug!("Replay already stopped; stop ignored"),
        }
    }

    fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.is_finished())
    }
}
