//! ## netpulse-cli
//! **Operator entrypoint for the netpulse pipeline**
//!
//! ### Expectations:
//! - POSIX-compliant argument parsing
//! - Configuration file plus environment overrides
//! - Live console feed of metrics snapshots and alerts

use anyhow::Result;
use clap::Parser;

use netpulse_telemetry::EventLogger;

mod commands;
mod console;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    EventLogger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run_synthetic(args),
        Commands::Replay(args) => commands::run_replay(args),
    }
}
