//! Packet store configuration.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Bounded packet store parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct StoreConfig {
    /// Maximum number of retained records; `null` keeps the log unbounded.
    #[serde(default = "default_capacity")]
    pub capacity: Option<usize>,
}

fn default_capacity() -> Option<usize> {
    Some(10_000)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}
