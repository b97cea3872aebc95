//! Cooperative scan timer.
//!
//! The timer re-arms itself only after the job has completed, so two runs
//! never overlap. The job runs on tokio's blocking pool because it walks
//! /proc synchronously.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, error, info};

/// Handle to a running periodic job.
pub struct ScanTimer {
    shutdown: watch::Sender<bool>,
    deadline: watch::Receiver<Instant>,
    handle: JoinHandle<()>,
}

impl ScanTimer {
    /// Arms the timer: `job` first runs at `now + interval`, then
    /// `interval` after each completed run.
    pub fn arm<F>(interval: Duration, job: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let job = Arc::new(job);
        let first = Instant::now() + interval;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (deadline_tx, deadline_rx) = watch::channel(first);

        let handle = tokio::spawn(async move {
            let mut deadline = first;
            loop {
                tokio::select! {
                    _ = time::sleep_until(deadline) => {}
                    _ = shutdown_rx.changed() => break,
                }

                let job = Arc::clone(&job);
                if let Err(e) = tokio::task::spawn_blocking(move || job()).await {
                    error!("Scan job panicked: {}", e);
                }

                if *shutdown_rx.borrow() {
                    break;
                }
                deadline = Instant::now() + interval;
                let _ = deadline_tx.send(deadline);
            }
            debug!("Scan timer loop exited");
        });

        info!("Scan timer armed with {} ms interval", interval.as_millis());
        Self {
            shutdown: shutdown_tx,
            deadline: deadline_rx,
            handle,
        }
    }

    /// Deadline of the next run.
    pub fn next_deadline(&self) -> Instant {
        *self.deadline.borrow()
    }

    /// Cancels the timer and waits for an in-flight run to finish.
    pub async fn cancel(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.handle.await {
            error!("Scan timer task failed: {}", e);
        }
        info!("Scan timer cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_deadline_is_in_future() {
        let timer = ScanTimer::arm(Duration::from_secs(60), || {});
        assert!(timer.next_deadline() > Instant::now());
        timer.cancel().await;
    }

    #[tokio::test]
    async fn test_cancel_before_first_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let timer = ScanTimer::arm(Duration::from_secs(60), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        timer.cancel().await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
    }
}
