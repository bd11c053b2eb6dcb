//! # netpulse-metrics
//!
//! Sliding-window traffic statistics for the netpulse pipeline.
//!
//! ### Key Submodules:
//! - `window`: time-bounded window with incremental aggregates
//! - `engine`: per-packet fold producing published snapshots
//!
//! The engine subscribes to packet-captured events and publishes one
//! metrics-updated event per packet; consumers read snapshots, never
//! engine state.

#![warn(unsafe_code)]

pub mod engine;
pub mod window;

pub use engine::MetricsEngine;
pub use window::{SlidingWindow, WindowEntry};
