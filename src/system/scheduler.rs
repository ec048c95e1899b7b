use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::system::store::SnapshotStore;

struct Worker {
    stop_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Background refresh loop over a shared [`SnapshotStore`].
///
/// Two states: idle (no worker) and running (exactly one worker thread).
/// `stop` joins the worker before returning, so callers can assume no
/// further collection happens afterwards.
pub struct RefreshScheduler {
    interval_ms: Arc<AtomicU64>,
    worker: Mutex<Option<Worker>>,
}

impl RefreshScheduler {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    pub fn new(interval: Duration) -> Self {
        RefreshScheduler {
            interval_ms: Arc::new(AtomicU64::new(interval.as_millis() as u64)),
            worker: Mutex::new(None),
        }
    }

    /// Takes effect on the worker's next cycle.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    pub fn is_running(&self) -> bool {
        self.lock_worker().is_some()
    }

    /// Spawn the refresh loop. No-op when already running.
    pub fn start(&self, store: Arc<SnapshotStore>) -> io::Result<()> {
        let mut worker = self.lock_worker();
        if worker.is_some() {
            return Ok(());
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval_ms = Arc::clone(&self.interval_ms);
        let handle = std::thread::Builder::new()
            .name("hostwatch-refresh".to_string())
            .spawn(move || {
                loop {
                    store.refresh_all();
                    let wait =
                        Duration::from_millis(interval_ms.load(Ordering::Relaxed).max(1));
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        // Stop signal, or the scheduler itself went away.
                        _ => break,
                    }
                }
            })?;

        *worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    /// Signal the worker and block until it has exited. No-op when idle.
    pub fn stop(&self) {
        let Some(worker) = self.lock_worker().take() else {
            return;
        };
        // Send can only fail when the worker already exited.
        let _ = worker.stop_tx.send(());
        let _ = worker.handle.join();
    }

    fn lock_worker(&self) -> std::sync::MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_is_mutable_at_runtime() {
        let scheduler = RefreshScheduler::default();
        assert_eq!(scheduler.interval(), Duration::from_secs(5));
        scheduler.set_interval(Duration::from_millis(250));
        assert_eq!(scheduler.interval(), Duration::from_millis(250));
    }

    #[test]
    fn stop_without_start_is_a_noop() {
        let scheduler = RefreshScheduler::default();
        scheduler.stop();
        assert!(!scheduler.is_running());
    }
}
