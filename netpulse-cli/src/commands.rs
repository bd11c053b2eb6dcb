//! Subcommand definitions and the run loops behind them.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use netpulse_capture::{CaptureSource, ReplaySource, SyntheticProfile, SyntheticSource};
use netpulse_config::{CaptureConfig, NetpulseConfig};
use netpulse_core::EventBus;
use netpulse_engine::Pipeline;

use crate::console::ConsoleSink;

#[derive(Parser)]
#[command(
    name = "netpulse",
    version,
    about = "Real-time network traffic metrics pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the pipeline over generated traffic
    Run(RunArgs),
    /// Replay a recorded scenario file through the pipeline
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Interface to capture on; the first advertised one when omitted
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Capture protocol filter (`ip` admits the full generated mix)
    #[arg(long, default_value = "ip")]
    pub protocol: String,

    /// Destination port filter; 0 keeps the generated mix
    #[arg(long, default_value_t = 0)]
    pub port: u16,

    /// Generated packets per second
    #[arg(long, default_value_t = 50.0)]
    pub rate: f64,

    /// Traffic seed; equal seeds generate identical traffic
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// How long to run, in seconds
    #[arg(long, default_value_t = 10)]
    pub duration: u64,

    /// Write the captured packet log to this JSON file on exit
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Configuration file; built-in defaults plus environment otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// Scenario file to replay
    pub scenario: PathBuf,

    /// Write the captured packet log to this JSON file on exit
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Configuration file; built-in defaults plus environment otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<NetpulseConfig> {
    match path {
        Some(path) => NetpulseConfig::load_from_path(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => NetpulseConfig::load().context("loading configuration"),
    }
}

pub fn run_synthetic(args: RunArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let bus = Arc::new(EventBus::new());
    let profile = SyntheticProfile {
        rate_pps: args.rate,
        seed: args.seed,
        ..Default::default()
    };
    let capture = Arc::new(SyntheticSource::new(profile, Arc::clone(&bus)));
    let pipeline = Pipeline::new(config, bus, capture);
    pipeline.bus().subscribe(Arc::new(ConsoleSink::new()));

    pipeline.start()?;
    pipeline.start_capture(CaptureConfig::new(args.protocol, args.port, args.interface));

    info!("Running for {}s", args.duration);
    std::thread::sleep(Duration::from_secs(args.duration));

    finish(&pipeline, args.export.as_deref())
}

pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let bus = Arc::new(EventBus::new());
    let capture = Arc::new(
        ReplaySource::from_file(&args.scenario, Arc::clone(&bus))
            .with_context(|| format!("loading scenario from {}", args.scenario.display()))?,
    );
    let scenario = capture.scenario();
    let expected = scenario.packets.len() as u64;
    let budget = Duration::from_millis(scenario.interval_ms)
        .saturating_mul(scenario.packets.len() as u32)
        .saturating_add(Duration::from_secs(5));

    let pipeline = Pipeline::new(config, bus, Arc::clone(&capture) as Arc<dyn CaptureSource>);
    pipeline.bus().subscribe(Arc::new(ConsoleSink::new()));

    pipeline.start()?;
    pipeline.start_capture(CaptureConfig::default());

    info!("Replaying {} packets", expected);
    let deadline = Instant::now() + budget;
    while pipeline.snapshot().total_packets < expected && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(50));
    }

    finish(&pipeline, args.export.as_deref())
}

fn finish(pipeline: &Pipeline, export: Option<&Path>) -> Result<()> {
    for question in [
        "How many total packets?",
        "What is the packet rate?",
        "Current throughput?",
        "Any alerts?",
    ] {
        println!("> {}", question);
        println!("{}", pipeline.answer(question)?);
    }

    if let Some(path) = export {
        let written = pipeline.export_packets(path)?;
        info!("Exported {} packets to {}", written, path.display());
    }

    let dropped = pipeline.store().dropped();
    if dropped > 0 {
        info!("Bounded store dropped {} packets", dropped);
    }

    pipeline.shutdown();
    Ok(())
}
