//! # Netpulse Configuration System
//!
//! Hierarchical configuration for every netpulse component, layered the
//! same way across deployments:
//!
//! 1. Built-in defaults
//! 2. `config/netpulse.yaml` (skipped when absent)
//! 3. `NETPULSE_*` environment variables (`__` separates nesting levels)
//!
//! Every loaded configuration is validated before it is handed out;
//! validation failures name the offending fields.

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod alerts;
mod capture;
mod controller;
mod error;
mod metrics;
mod store;
mod validation;

pub use alerts::AlertConfig;
pub use capture::CaptureConfig;
pub use controller::ControllerConfig;
pub use error::ConfigError;
pub use metrics::MetricsConfig;
pub use store::StoreConfig;
pub use validation::{validate_interface, validate_protocol};

/// Default configuration file consulted by [`NetpulseConfig::load`].
pub const DEFAULT_CONFIG_PATH: &str = "config/netpulse.yaml";

/// Environment variable prefix for overrides (`NETPULSE_METRICS__WINDOW_SECONDS=5`).
pub const ENV_PREFIX: &str = "NETPULSE_";

/// Top-level configuration container for all netpulse components.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone)]
pub struct NetpulseConfig {
    /// Metrics engine: window sizing, top-N depth, anomaly thresholds.
    #[validate(nested)]
    pub metrics: MetricsConfig,

    /// Alert evaluator: condition thresholds and cooldown policy.
    #[validate(nested)]
    pub alerts: AlertConfig,

    /// Bounded packet store sizing.
    #[validate(nested)]
    pub store: StoreConfig,

    /// Command controller drain-loop timing.
    #[validate(nested)]
    pub controller: ControllerConfig,
}

impl NetpulseConfig {
    /// Load configuration from the default file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(NetpulseConfig::default()));

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        }

        Self::extract(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Load configuration from a specific file, still honoring environment
    /// overrides. Fails when the file does not exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        let figment = Figment::from(Serialized::defaults(NetpulseConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn full_config_validation() {
        let config = NetpulseConfig::default();
        config.validate().expect("default config should validate");
    }

    #[test]
    fn environment_override() {
        // Override a nested field via environment variable.
        std::env::set_var("NETPULSE_ALERTS__COOLDOWN_SECONDS", "5.0");
        let config = NetpulseConfig::load().unwrap();
        assert_eq!(config.alerts.cooldown_seconds, 5.0);
        std::env::remove_var("NETPULSE_ALERTS__COOLDOWN_SECONDS");
    }

    #[test]
    fn yaml_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netpulse.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "metrics:\n  top_n_talkers: 3\nstore:\n  capacity: 42").unwrap();

        let config = NetpulseConfig::load_from_path(&path).unwrap();
        assert_eq!(config.metrics.top_n_talkers, 3);
        assert_eq!(config.store.capacity, Some(42));
        // Untouched sections keep their defaults.
        assert_eq!(config.controller.poll_interval_ms, 200);
    }

    #[test]
    fn invalid_values_are_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("netpulse.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "metrics:\n  top_n_talkers: 0").unwrap();

        assert!(matches!(
            NetpulseConfig::load_from_path(&path),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn missing_explicit_path_is_reported() {
        assert!(matches!(
            NetpulseConfig::load_from_path("does/not/exist.yaml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }
}
