//! Seeded synthetic traffic generator.
//!
//! Stands in for a live sniffer: emits a plausible packet mix at a
//! configured rate from a deterministic RNG, so full-pipeline runs are
//! reproducible for a given seed. Occasional SYN and RST floods are
//! mixed in to give the anomaly indicators something to trip over.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use validator::Validate;

use netpulse_config::{CaptureConfig, ConfigError};
use netpulse_core::{clock, Event, EventBus, PacketRecord, TcpFlags};

use crate::worker::{sleep_unless_stopped, CaptureWorker};
use crate::{CaptureError, CaptureSource};

/// Traffic shape of a synthetic source.
#[derive(Debug, Clone)]
pub struct SyntheticProfile {
    /// Interfaces this source can pretend to capture on. Probing picks
    /// the first one when the capture config names none.
    pub interfaces: Vec<String>,
    /// Emission rate, packets per second.
    pub rate_pps: f64,
    /// RNG seed; equal seeds produce equal packet sequences.
    pub seed: u64,
}

impl Default for SyntheticProfile {
    fn default() -> Self {
        Self {
            interfaces: vec!["synth0".to_string()],
            rate_pps: 50.0,
            seed: 42,
        }
    }
}

/// Capture source producing generated traffic on a background thread.
pub struct SyntheticSource {
    bus: Arc<EventBus>,
    profile: SyntheticProfile,
    worker: Mutex<Option<CaptureWorker>>,
}

impl SyntheticSource {
    pub fn new(profile: SyntheticProfile, bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            profile,
            worker: Mutex::new(None),
        }
    }

    fn resolve_interface(&self, config: &CaptureConfig) -> Result<String, CaptureError> {
        if let Some(requested) = &config.interface {
            if self.profile.interfaces.iter().any(|i| i == requested) {
                return Ok(requested.clone());
            }
            return Err(CaptureError::InterfaceUnavailable(requested.clone()));
        }
        // Every synthetic interface yields traffic, so probing reduces
        // to taking the first one.
        self.profile
            .interfaces
            .first()
            .cloned()
            .ok_or(CaptureError::NoActiveInterface)
    }
}

impl CaptureSource for SyntheticSource {
    fn start(&self, config: &CaptureConfig) -> Result<(), CaptureError> {
        config.validate().map_err(ConfigError::from)?;

        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(|w| !w.is_finished()) {
            debug!("Synthetic capture already running; start ignored");
            return Ok(());
        }

        let interface = self.resolve_interface(config)?;
        info!(
            "Starting synthetic capture on '{}' at {} pkts/s (seed {})",
            interface, self.profile.rate_pps, self.profile.seed
        );

        let bus = Arc::clone(&self.bus);
        let profile = self.profile.clone();
        let config = config.clone();
        *worker = Some(CaptureWorker::spawn("netpulse-capture", move |stop| {
            generate_loop(&bus, &profile, &config, &stop);
            debug!("Synthetic capture worker exiting");
        })?);
        Ok(())
    }

    fn stop(&self, grace: Duration) {
        let worker = self.worker.lock().take();
        match worker {
            Some(worker) => worker.stop(grace),
            None => debug!("Synthetic capture already stopped; stop ignored"),
        }
    }

    fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.is_finished())
    }
}

fn generate_loop(
    bus: &EventBus,
    profile: &SyntheticProfile,
    config: &CaptureConfig,
    stop: &AtomicBool,
) {
    let mut rng = SmallRng::seed_from_u64(profile.seed);
    let interval = Duration::from_secs_f64(1.0 / profile.rate_pps.max(0.001));
    let tcp_allowed = config.protocol.eq_ignore_ascii_case("ip")
        || config.protocol.eq_ignore_ascii_case("tcp");
    // (flood is SYN, packets left in the burst)
    let mut burst: Option<(bool, u32)> = None;
    loop {
        let record = if let Some((syn, remaining)) = burst {
            burst = (remaining > 1).then_some((syn, remaining - 1));
            flood_packet(&mut rng, config, syn)
        } else {
            if tcp_allowed && rng.random_bool(0.01) {
                burst = Some((rng.random_bool(0.7), rng.random_range(5..=15)));
            }
            synth_packet(&mut rng, config)
        };
        bus.publish(&Event::PacketCaptured(record));
        if !sleep_unless_stopped(stop, interval) {
            return;
        }
    }
}

fn synth_packet(rng: &mut SmallRng, config: &CaptureConfig) -> PacketRecord {
    let protocol = if config.protocol.eq_ignore_ascii_case("ip") {
        ["tcp", "udp", "dns", "http", "icmp"][rng.random_range(0..5)].to_string()
    } else {
        config.protocol.clone()
    };
    let is_tcp = protocol.eq_ignore_ascii_case("tcp") || protocol.eq_ignore_ascii_case("http");

    let src_ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, rng.random_range(1..=8)));
    let dst_ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, rng.random_range(1..=4)));
    let src_port: u16 = rng.random_range(1024..=65535);
    let dst_port = if config.port != 0 {
        config.port
    } else {
        [80u16, 443, 53, 8080][rng.random_range(0..4)]
    };
    let length: u32 = rng.random_range(60..=1514);

    let flags = is_tcp.then(|| TcpFlags {
        syn: rng.random_bool(0.2),
        ack: rng.random_bool(0.8),
        fin: rng.random_bool(0.05),
        rst: rng.random_bool(0.05),
        psh: rng.random_bool(0.3),
        urg: false,
    });

    let summary = format!(
        "{} {}:{} -> {}:{} len {}",
        protocol.to_uppercase(),
        src_ip,
        src_port,
        dst_ip,
        dst_port,
        length
    );

    PacketRecord {
        timestamp: Some(clock::unix_now()),
        length: Some(length),
        protocol,
        src_ip: Some(src_ip),
        dst_ip: Some(dst_ip),
        src_port: Some(src_port),
        dst_port: Some(dst_port),
        flags,
        malformed: rng.random_bool(0.01),
        summary,
    }
}

/// One packet of a SYN or RST flood: minimal TCP segments against a
/// single service port.
fn flood_packet(rng: &mut SmallRng, config: &CaptureConfig, syn: bool) -> PacketRecord {
    let src_ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, rng.random_range(1..=8)));
    let dst_ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, rng.random_range(1..=4)));
    let src_port: u16 = rng.random_range(1024..=65535);
    let dst_port = if config.port != 0 { config.port } else { 80 };
    let length: u32 = rng.random_range(40..=60);
    let summary = format!(
        "TCP {}:{} -> {}:{} len {} [{}]",
        src_ip,
        src_port,
        dst_ip,
        dst_port,
        length,
        if syn { "SYN" } else { "RST" }
    );

    PacketRecord {
        timestamp: Some(clock::unix_now()),
        length: Some(length),
        protocol: "tcp".to_string(),
        src_ip: Some(src_ip),
        dst_ip: Some(dst_ip),
        src_port: Some(src_port),
        dst_port: Some(dst_port),
        flags: Some(TcpFlags {
            syn,
            ack: false,
            fin: false,
            rst: !syn,
            psh: false,
            urg: false,
        }),
        malformed: false,
        summary,
    }
}
