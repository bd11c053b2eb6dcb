//! Construction and wiring of the full pipeline.
//!
//! Subscription order fixes delivery order: the metrics engine folds a
//! packet before the store and the telemetry sink see it, and the alert
//! evaluator runs inside the metrics publication that follows, so every
//! alert is judged against a snapshot that already includes the packet
//! that triggered it.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use netpulse_alerts::AlertEvaluator;
use netpulse_capture::CaptureSource;
use netpulse_config::{CaptureConfig, NetpulseConfig};
use netpulse_core::{Event, EventBus, MetricsSnapshot, Observer, QueryMessage};
use netpulse_metrics::MetricsEngine;
use netpulse_store::SharedPacketStore;
use netpulse_telemetry::PipelineMetrics;

use crate::controller::CommandController;
use crate::query::{QueryHandler, QueryResponder};
use crate::sinks::TelemetrySink;
use crate::PipelineError;

/// A fully wired pipeline over one capture source.
pub struct Pipeline {
    config: NetpulseConfig,
    bus: Arc<EventBus>,
    engine: Arc<MetricsEngine>,
    store: Arc<SharedPacketStore>,
    telemetry: Arc<PipelineMetrics>,
    responder: Arc<QueryResponder>,
    controller: Arc<CommandController>,
    capture: Arc<dyn CaptureSource>,
}

impl Pipeline {
    /// Wire every component onto the given bus. The capture source must
    /// publish onto the same bus.
    pub fn new(
        config: NetpulseConfig,
        bus: Arc<EventBus>,
        capture: Arc<dyn CaptureSource>,
    ) -> Self {
        info!("Initializing pipeline");
        debug!("Metrics config: {:?}", config.metrics);

        let engine = Arc::new(MetricsEngine::new(config.metrics.clone(), Arc::clone(&bus)));
        let evaluator = Arc::new(AlertEvaluator::new(config.alerts.clone(), Arc::clone(&bus)));
        let store = Arc::new(SharedPacketStore::with_capacity(config.store.capacity));
        let telemetry = Arc::new(PipelineMetrics::new());
        let responder = Arc::new(QueryResponder::new(Arc::clone(&engine), Arc::clone(&store)));
        let controller = Arc::new(CommandController::new(
            config.controller.clone(),
            Arc::clone(&bus),
            Arc::clone(&capture),
            Arc::clone(&responder) as Arc<dyn QueryHandler>,
        ));

        bus.subscribe(Arc::clone(&engine) as Arc<dyn Observer>);
        bus.subscribe(Arc::clone(&store) as Arc<dyn Observer>);
        bus.subscribe(Arc::new(TelemetrySink::new(Arc::clone(&telemetry))));
        bus.subscribe(Arc::clone(&evaluator) as Arc<dyn Observer>);
        bus.subscribe(Arc::clone(&controller) as Arc<dyn Observer>);

        Self {
            config,
            bus,
            engine,
            store,
            telemetry,
            responder,
            controller,
            capture,
        }
    }

    /// Start the command controller drain thread.
    pub fn start(&self) -> Result<(), PipelineError> {
        self.controller.start()
    }

    /// Queue a command for the drain thread directly.
    pub fn submit(&self, event: Event) {
        self.controller.submit(event);
    }

    /// Publish a start-capture intent.
    pub fn start_capture(&self, config: CaptureConfig) {
        self.bus.publish(&Event::StartCaptureRequested(config));
    }

    /// Publish a stop-capture intent.
    pub fn stop_capture(&self) {
        self.bus.publish(&Event::StopCaptureRequested);
    }

    /// Publish an operator question; the controller answers it on the
    /// drain thread and logs the response.
    pub fn raise_query(&self, text: impl Into<String>) {
        self.bus.publish(&Event::QueryRaised(QueryMessage::new(text)));
    }

    /// Answer a question immediately, bypassing the command queue.
    pub fn answer(&self, text: &str) -> Result<String, PipelineError> {
        self.responder.respond(&QueryMessage::new(text))
    }

    /// Latest metrics snapshot.
    pub fn snapshot(&self) -> Arc<MetricsSnapshot> {
        self.engine.get()
    }

    /// Write the stored packet log as a JSON array; returns how many
    /// records were written.
    pub fn export_packets<P: AsRef<Path>>(&self, path: P) -> Result<usize, PipelineError> {
        let store = self.store.lock();
        store.export(path)?;
        Ok(store.len())
    }

    /// Stop capture and the controller, in that order.
    pub fn shutdown(&self) {
        info!("Shutting down pipeline");
        self.capture.stop(self.config.controller.stop_grace());
        self.controller.stop();
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<SharedPacketStore> {
        &self.store
    }

    pub fn telemetry(&self) -> &Arc<PipelineMetrics> {
        &self.telemetry
    }

    pub fn controller(&self) -> &Arc<CommandController> {
        &self.controller
    }

    pub fn config(&self) -> &NetpulseConfig {
        &self.config
    }

    pub fn capture_running(&self) -> bool {
        self.capture.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_capture::{SyntheticProfile, SyntheticSource};

    fn synthetic_pipeline() -> Pipeline {
        let bus = Arc::new(EventBus::new());
        let capture = Arc::new(SyntheticSource::new(
            SyntheticProfile::default(),
            Arc::clone(&bus),
        ));
        Pipeline::new(NetpulseConfig::default(), bus, capture)
    }

    #[test]
    fn wires_all_subscribers() {
        let pipeline = synthetic_pipeline();
        // Engine, store, telemetry sink, evaluator, controller.
        assert_eq!(pipeline.bus().subscriber_count(), 5);
    }

    #[test]
    fn answers_without_a_running_controller() {
        let pipeline = synthetic_pipeline();
        assert_eq!(
            pipeline.answer("total packets?").unwrap(),
            "Total packets captured: 0."
        );
    }

    #[test]
    fn snapshot_starts_empty() {
        let pipeline = synthetic_pipeline();
        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.total_packets, 0);
        assert!(!pipeline.capture_running());
    }
}
