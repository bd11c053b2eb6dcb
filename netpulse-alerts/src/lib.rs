//! # netpulse-alerts
//!
//! Threshold alerting over published metrics snapshots.
//!
//! The evaluator checks each snapshot against static thresholds and
//! publishes one alert per condition that holds. By default a sustained
//! condition re-fires on every update; a configurable cooldown
//! suppresses repeats of the same alert type.

#![warn(unsafe_code)]

mod evaluator;

pub use evaluator::AlertEvaluator;
