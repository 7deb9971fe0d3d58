use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::client::GistQueue;

const JOIN_POLL: Duration = Duration::from_millis(10);

/// Background retention sweeper: runs a full cleanup pass over all queues,
/// then sleeps for the configured interval or until stopped. The loop waits
/// on a channel, so a stop request is observed without polling a flag.
pub struct RetentionSweeper {
    queue: Arc<GistQueue>,
    worker: Option<SweeperWorker>,
}

struct SweeperWorker {
    handle: JoinHandle<()>,
    stop: Sender<()>,
}

impl std::fmt::Debug for RetentionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionSweeper")
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl RetentionSweeper {
    pub fn new(queue: Arc<GistQueue>) -> Self {
        Self {
            queue,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    /// Spawn the sweep loop. Returns `false` when it is already running; only
    /// one loop may be active per sweeper.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let queue = Arc::clone(&self.queue);
        let interval = queue.config().cleanup.interval;

        let handle = thread::spawn(move || {
            loop {
                // Failures are recorded in the request log by the cleanup
                // pass itself; the loop keeps its schedule either way.
                let _ = queue.cleanup_all_queues();

                match stop_rx.recv_timeout(interval) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {}
                }
            }
        });

        self.worker = Some(SweeperWorker {
            handle,
            stop: stop_tx,
        });
        true
    }

    /// Start the loop only when `CLEANUP_AUTO_START` enabled it.
    pub fn start_if_configured(&mut self) -> bool {
        self.queue.config().cleanup.auto_start && self.start()
    }

    /// Signal the loop to stop and wait up to `timeout` for it to exit.
    /// Returns `false` when not running or when the loop did not exit in
    /// time (in which case it stays owned and a later stop may succeed).
    pub fn stop(&mut self, timeout: Duration) -> bool {
        let Some(worker) = self.worker.take() else {
            return false;
        };

        let _ = worker.stop.send(());
        let deadline = Instant::now() + timeout;
        while !worker.handle.is_finished() {
            if Instant::now() >= deadline {
                self.worker = Some(worker);
                return false;
            }
            thread::sleep(JOIN_POLL);
        }
        worker.handle.join().is_ok()
    }
}

impl Drop for RetentionSweeper {
    fn drop(&mut self) {
        // Dropping the sender ends the loop at its next wait; no join here,
        // the thread exits on its own.
        self.worker = None;
    }
}
