//! Background worker lifecycle shared by capture sources.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, Receiver};
use tracing::warn;

/// One spawned capture thread with its stop flag and completion signal.
///
/// The body receives the stop flag and must check it between packets;
/// completion is signalled through a channel so `stop` can bound its
/// wait without blocking on `join`.
pub(crate) struct CaptureWorker {
    stop: Arc<AtomicBool>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

impl CaptureWorker {
    pub(crate) fn spawn<F>(name: &str, body: F) -> io::Result<Self>
    where
        F: FnOnce(Arc<AtomicBool>) + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = bounded(1);
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new().name(name.to_string()).spawn(move || {
            body(stop_flag);
            let _ = done_tx.send(());
        })?;
        Ok(Self {
            stop,
            done_rx,
            handle,
        })
    }

    /// Whether the worker body has returned (naturally or after stop).
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal the worker to stop and wait up to `grace` for it to
    /// acknowledge; a worker missing the deadline is abandoned.
    pub(crate) fn stop(self, grace: Duration) {
        self.stop.store(true, Ordering::Relaxed);
        match self.done_rx.recv_timeout(grace) {
            Ok(()) => {
                if self.handle.join().is_err() {
                    warn!("Capture worker panicked during shutdown");
                }
            }
            Err(_) => {
                warn!(
                    "Capture worker did not acknowledge stop within {:?}; abandoning",
                    grace
                );
            }
        }
    }
}

/// Sleep for `duration` in short slices, returning early (false) once
/// `stop` is raised. Returns true when the full duration elapsed.
pub(crate) fn sleep_unless_stopped(stop: &AtomicBool, duration: Duration) -> bool {
    const SLICE: Duration = Duration::from_millis(20);
    let mut remaining = duration;
    while remaining > Duration::ZERO {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let nap = remaining.min(SLICE);
        thread::sleep(nap);
        remaining -= nap;
    }
    !stop.load(Ordering::Relaxed)
}
