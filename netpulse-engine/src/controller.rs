//! Operator command intake and execution.
//!
//! Commands arrive as events, submitted directly or forwarded off the
//! bus, and land in an unbounded FIFO queue. A dedicated drain thread
//! executes them one at a time; a failed command becomes an `error`
//! alert on the bus and the thread moves on to the next command.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use opentelemetry::KeyValue;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use netpulse_capture::CaptureSource;
use netpulse_config::ControllerConfig;
use netpulse_core::{AlertInfo, Event, EventBus, EventError, EventKind, Observer, Severity};
use netpulse_telemetry::EventLogger;

use crate::query::QueryHandler;
use crate::PipelineError;

const INTERESTS: [EventKind; 3] = [
    EventKind::QueryRaised,
    EventKind::StartCaptureRequested,
    EventKind::StopCaptureRequested,
];

struct DrainWorker {
    stop: Arc<AtomicBool>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

/// FIFO command executor with a dedicated drain thread.
///
/// `submit` never blocks; commands run in submission order. The drain
/// loop waits on the intake queue with a bounded timeout so a raised
/// stop flag is noticed within one poll interval.
pub struct CommandController {
    config: ControllerConfig,
    bus: Arc<EventBus>,
    capture: Arc<dyn CaptureSource>,
    query_handler: Arc<dyn QueryHandler>,
    intake_tx: Sender<Event>,
    intake_rx: Receiver<Event>,
    worker: Mutex<Option<DrainWorker>>,
}

impl CommandController {
    pub fn new(
        config: ControllerConfig,
        bus: Arc<EventBus>,
        capture: Arc<dyn CaptureSource>,
        query_handler: Arc<dyn QueryHandler>,
    ) -> Self {
        let (intake_tx, intake_rx) = unbounded();
        Self {
            config,
            bus,
            capture,
            query_handler,
            intake_tx,
            intake_rx,
            worker: Mutex::new(None),
        }
    }

    /// Queue a command without blocking, from any thread.
    pub fn submit(&self, event: Event) {
        if let Err(e) = self.intake_tx.send(event) {
            warn!("Failed to queue command: {}", e);
        }
    }

    /// Spawn the drain thread. Starting a running controller is a no-op.
    pub fn start(&self) -> Result<(), PipelineError> {
        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            debug!("Controller already running; start ignored");
            return Ok(());
        }

        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = bounded::<()>(1);
        let intake_rx = self.intake_rx.clone();
        let bus = Arc::clone(&self.bus);
        let capture = Arc::clone(&self.capture);
        let query_handler = Arc::clone(&self.query_handler);
        let poll_interval = self.config.poll_interval();
        let stop_grace = self.config.stop_grace();

        let thread_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("netpulse-controller".to_string())
            .spawn(move || {
                info!("Command controller started");
                while !thread_stop.load(Ordering::Relaxed) {
                    match intake_rx.recv_timeout(poll_interval) {
                        Ok(event) => {
                            let outcome = execute(
                                &event,
                                capture.as_ref(),
                                query_handler.as_ref(),
                                stop_grace,
                            );
                            if let Err(e) = outcome {
                                error!("Command failed: {}", e);
                                bus.publish(&Event::AlertGenerated(AlertInfo::new(
                                    "error",
                                    e.to_string(),
                                    Severity::Error,
                                )));
                            }
                        }
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("Command controller exiting");
                let _ = done_tx.send(());
            })?;

        *worker = Some(DrainWorker {
            stop,
            done_rx,
            handle,
        });
        Ok(())
    }

    /// Stop the drain thread, waiting up to the configured join timeout.
    /// A thread that misses the deadline is abandoned, never killed.
    pub fn stop(&self) {
        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            debug!("Controller already stopped; stop ignored");
            return;
        };

        worker.stop.store(true, Ordering::Relaxed);
        match worker.done_rx.recv_timeout(self.config.join_timeout()) {
            Ok(()) => {
                if worker.handle.join().is_err() {
                    warn!("Controller thread panicked during shutdown");
                }
            }
            Err(_) => warn!(
                "Controller thread did not stop within {:?}; abandoning it",
                self.config.join_timeout()
            ),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }
}

impl Observer for CommandController {
    fn name(&self) -> &'static str {
        "command_controller"
    }

    fn interests(&self) -> &[EventKind] {
        &INTERESTS
    }

    fn on_event(&self, event: &Event) -> Result<(), EventError> {
        if !INTERESTS.contains(&event.kind()) {
            return Err(EventError::UnexpectedKind {
                observer: self.name(),
                kind: event.kind(),
            });
        }
        self.submit(event.clone());
        Ok(())
    }
}

fn execute(
    event: &Event,
    capture: &dyn CaptureSource,
    query_handler: &dyn QueryHandler,
    stop_grace: Duration,
) -> Result<(), PipelineError> {
    match event {
        Event::StartCaptureRequested(config) => {
            capture.start(config)?;
            info!("Capture started on request");
            EventLogger::log_event(
                "capture_started",
                vec![KeyValue::new("protocol", config.protocol.clone())],
            );
            Ok(())
        }
        Event::StopCaptureRequested => {
            capture.stop(stop_grace);
            info!("Capture stopped on request");
            EventLogger::log_event("capture_stopped", vec![]);
            Ok(())
        }
        Event::QueryRaised(query) => {
            let response = query_handler.respond(query)?;
            info!("Query '{}' answered: {}", query.text, response);
            EventLogger::log_event(
                "query_answered",
                vec![KeyValue::new("query", query.text.clone())],
            );
            Ok(())
        }
        other => Err(EventError::UnexpectedKind {
            observer: "command_controller",
            kind: other.kind(),
        }
        .into()),
    }
}
