// Detached background work that must never fail the request that spawned it.
//
// Responsibilities
// - Spawn side effects (notifications, emails, counters) as tokio tasks.
// - Log task failures and panics instead of propagating them.
// - Let the binary, and tests, wait for outstanding work.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Default)]
pub struct BackgroundTasks {
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F>(&self, task_name: &'static str, task: F)
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            if let Err(error) = task.await {
                warn!(task = task_name, error = %error, "background task failed");
            }
        });
        match self.handles.lock() {
            Ok(mut handles) => {
                handles.retain(|handle| !handle.is_finished());
                handles.push(handle);
            }
            // A poisoned registry only loses the ability to await this task.
            Err(_) => warn!(task = task_name, "background task registry poisoned"),
        }
    }

    /// Waits for every task spawned so far, including tasks spawned while draining.
    pub async fn drain(&self) {
        loop {
            let pending: Vec<JoinHandle<()>> = match self.handles.lock() {
                Ok(mut handles) => handles.drain(..).collect(),
                Err(_) => return,
            };
            if pending.is_empty() {
                return;
            }
            for handle in pending {
                if let Err(error) = handle.await {
                    warn!(error = %error, "background task panicked");
                }
            }
        }
    }

    /// Drains with an upper bound, for shutdown.
    pub async fn drain_within(&self, limit: Duration) {
        if tokio::time::timeout(limit, self.drain()).await.is_err() {
            warn!(limit_secs = limit.as_secs(), "background tasks still running at shutdown");
        }
    }
}

#[cfg(test)]
mod background_tasks_tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[rstest]
    #[tokio::test]
    async fn it_should_run_every_spawned_task_before_drain_returns() {
        let tasks = BackgroundTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let counter = counter.clone();
            tasks.spawn("count", async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        }
        tasks.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_swallow_task_failures() {
        let tasks = BackgroundTasks::new();
        let counter = Arc::new(AtomicUsize::new(0));
        tasks.spawn("fails", async { Err(anyhow::anyhow!("mail relay down")) });
        let after = counter.clone();
        tasks.spawn("succeeds", async move {
            after.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        tasks.drain().await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_immediately_when_nothing_was_spawned() {
        BackgroundTasks::new()
            .drain_within(Duration::from_millis(10))
            .await;
    }
}
