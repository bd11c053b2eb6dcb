use thiserror::Error;

use netpulse_capture::CaptureError;
use netpulse_config::ConfigError;
use netpulse_core::EventError;
use netpulse_store::StoreError;

/// Failures surfaced by pipeline commands.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
