//! # netpulse-capture
//!
//! Capture source boundary for the netpulse pipeline.
//!
//! ### Key Submodules:
//! - `synthetic`: seeded traffic generator for live-like runs
//! - `replay`: deterministic playback of YAML scenario files
//!
//! A started source publishes packet-captured events on the bus from a
//! background worker until stopped. Start and stop are idempotent, and
//! stopping is cooperative: the worker checks a flag between packets
//! and is abandoned (not killed) if it misses the grace period.

#![warn(unsafe_code)]

use std::time::Duration;

use thiserror::Error;

use netpulse_config::{CaptureConfig, ConfigError};

mod replay;
mod synthetic;
mod worker;

pub use replay::{ReplaySource, Scenario};
pub use synthetic::{SyntheticProfile, SyntheticSource};

/// Capture boundary failure conditions.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The capture settings were rejected before any state change.
    #[error("Capture configuration invalid: {0}")]
    Config(#[from] ConfigError),

    /// The requested interface does not exist or cannot be opened.
    #[error("Interface '{0}' unavailable")]
    InterfaceUnavailable(String),

    /// Interface probing found nothing producing traffic.
    #[error("No active capture interface found")]
    NoActiveInterface,

    /// A scenario file did not parse.
    #[error("Scenario file invalid: {0}")]
    Scenario(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Boundary contract every capture implementation satisfies.
pub trait CaptureSource: Send + Sync {
    /// Begin producing packet-captured events with the given settings.
    /// Starting an already-running source is a no-op.
    fn start(&self, config: &CaptureConfig) -> Result<(), CaptureError>;

    /// Cooperatively stop the producer, waiting up to `grace` for the
    /// worker to acknowledge before abandoning it. Stopping an already
    /// stopped source is a no-op.
    fn stop(&self, grace: Duration);

    /// Whether a started worker is still producing.
    fn is_running(&self) -> bool;
}
