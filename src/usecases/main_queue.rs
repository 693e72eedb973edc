//! Single logical "main" execution context.
//!
//! Jobs are submitted from any task and run one at a time, in submission order,
//! on one dedicated task. Store mutation and event emission happen only here.

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::{debug, warn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Handle to the serial executor. Cloning is cheap; the executor task ends
/// once every handle is dropped and the queue is drained.
#[derive(Clone)]
pub struct MainQueue {
    tx: mpsc::UnboundedSender<Job>,
}

impl MainQueue {
    /// Spawn the executor task. Must be called from within a tokio runtime.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job.await;
            }
            debug!("main queue finished (all handles dropped)");
        });
        Self { tx }
    }

    /// Enqueue a job. Never blocks; the job runs after everything queued before it.
    pub fn dispatch<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.tx.send(Box::pin(job)).is_err() {
            warn!("main queue closed, dropping job");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_jobs_run_in_submission_order() {
        let queue = MainQueue::spawn();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..5 {
            let seen = Arc::clone(&seen);
            queue.dispatch(async move {
                // Yield inside the job: the next job must still wait for this one.
                tokio::task::yield_now().await;
                seen.lock().unwrap().push(i);
            });
        }

        let (done_tx, done_rx) = oneshot::channel();
        queue.dispatch(async move {
            let _ = done_tx.send(());
        });
        done_rx.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }
}
