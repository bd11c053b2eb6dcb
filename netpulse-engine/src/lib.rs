//! # netpulse-engine
//!
//! Pipeline assembly and operator command handling.
//!
//! ### Key Submodules:
//! - `controller`: FIFO command intake with a dedicated drain thread
//! - `query`: keyword responder over live metrics and stored packets
//! - `sinks`: bus observer feeding the Prometheus counters
//! - `pipeline`: construction and wiring of the full pipeline

#![warn(unsafe_code)]

mod controller;
mod error;
mod pipeline;
mod query;
mod sinks;

pub use self::{
    controller::CommandController,
    error::PipelineError,
    pipeline::Pipeline,
    query::{QueryHandler, QueryResponder},
    sinks::TelemetrySink,
};

pub mod prelude {
    pub use super::{CommandController, Pipeline, PipelineError, QueryHandler, QueryResponder};
}
