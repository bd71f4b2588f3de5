//! Background task registry with cooperative, time-bounded shutdown.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{info, warn};

/// Outcome of [`TaskRegistry::shutdown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Tasks that exited within the grace period.
    pub finished: usize,
    /// Tasks that were still running and got aborted.
    pub aborted: usize,
}

/// Owns the simulator's background tasks.
///
/// Tasks receive a shutdown signal through a `watch` channel and are
/// expected to return once it flips to `true`. Stragglers are aborted when
/// the grace period ends.
#[derive(Debug)]
pub struct TaskRegistry {
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<(String, JoinHandle<()>)>,
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            shutdown_tx,
            tasks: Vec::new(),
        }
    }

    /// A receiver that observes the shutdown signal.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Spawn `task` on the current runtime and track it under `name`.
    pub fn spawn<F>(&mut self, name: impl Into<String>, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((name.into(), tokio::spawn(task)));
    }

    /// Number of tracked tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if no task is tracked.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Signal shutdown and wait up to `grace` for every task to exit.
    ///
    /// The grace period is shared: it bounds the whole shutdown, not each
    /// task. Tasks still running at the deadline are aborted.
    pub async fn shutdown(self, grace: Duration) -> ShutdownReport {
        info!(tasks = self.tasks.len(), "Shutting down background tasks");
        // Send only fails when no receiver is alive, i.e. nothing to stop.
        let _ = self.shutdown_tx.send(true);

        let deadline = Instant::now() + grace;
        let mut report = ShutdownReport::default();

        for (name, mut handle) in self.tasks {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => report.finished += 1,
                Ok(Err(e)) => {
                    warn!(task = %name, error = %e, "Task ended abnormally");
                    report.finished += 1;
                }
                Err(_) => {
                    warn!(task = %name, "Task did not stop in time, cancelling");
                    handle.abort();
                    report.aborted += 1;
                }
            }
        }

        info!(
            finished = report.finished,
            aborted = report.aborted,
            "Background tasks shut down"
        );
        report
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait until `cancel` reports shutdown. Also returns if the sender is gone.
pub(crate) async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    // wait_for errors only when the sender was dropped.
    let _ = cancel.wait_for(|stop| *stop).await;
}
