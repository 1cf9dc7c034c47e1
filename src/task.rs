//! Deferred tasks: fixed delay, then a body that may fail.
//!
//! Stands in for the simulated network calls (file validation, activation
//! email). A real integration replaces only the body.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};
use uuid::Uuid;

/// How a deferred task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Succeeded(T),
    Failed(String),
    Cancelled,
}

/// Handle to a spawned deferred task.
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: Uuid,
    label: &'static str,
    inner: JoinHandle<Result<T, String>>,
}

impl<T> TaskHandle<T> {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Abort the task. The body never runs if the delay has not elapsed.
    pub fn cancel(&self) {
        debug!(task_id = %self.id, label = self.label, "Cancelling deferred task");
        self.inner.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the task and classify how it ended.
    pub async fn outcome(self) -> TaskOutcome<T> {
        match self.inner.await {
            Ok(Ok(value)) => TaskOutcome::Succeeded(value),
            Ok(Err(reason)) => TaskOutcome::Failed(reason),
            Err(e) if e.is_cancelled() => TaskOutcome::Cancelled,
            Err(e) => {
                warn!(task_id = %self.id, label = self.label, error = %e, "Deferred task panicked");
                TaskOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Spawn `body` on the runtime after sleeping `delay`.
pub fn spawn_deferred<F, Fut, T>(label: &'static str, delay: Duration, body: F) -> TaskHandle<T>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
    T: Send + 'static,
{
    let id = Uuid::new_v4();
    let span = info_span!("deferred_task", task_id = %id, label);

    let inner = tokio::spawn(
        async move {
            debug!(delay_ms = delay.as_millis() as u64, "Deferred task started");
            tokio::time::sleep(delay).await;
            let result = body().await;
            match &result {
                Ok(_) => debug!("Deferred task succeeded"),
                Err(reason) => warn!(reason = %reason, "Deferred task failed"),
            }
            result
        }
        .instrument(span),
    );

    TaskHandle { id, label, inner }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn body_runs_after_delay() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let handle = spawn_deferred("test", Duration::from_secs(2), move || async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, String>(42)
        });

        tokio::time::advance(Duration::from_millis(1999)).await;
        tokio::task::yield_now().await;
        assert!(!ran.load(Ordering::SeqCst));
        assert!(!handle.is_finished());

        assert_eq!(handle.outcome().await, TaskOutcome::Succeeded(42));
        assert!(ran.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_body_reports_reason() {
        let handle = spawn_deferred("test", Duration::from_secs(1), || async {
            Err::<(), _>("servidor indisponível".to_string())
        });
        assert_eq!(
            handle.outcome().await,
            TaskOutcome::Failed("servidor indisponível".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_delay_skips_body() {
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);

        let handle = spawn_deferred("test", Duration::from_secs(2), move || async move {
            flag.store(true, Ordering::SeqCst);
            Ok::<_, String>(())
        });
        handle.cancel();

        assert_eq!(handle.outcome().await, TaskOutcome::Cancelled);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn handles_have_distinct_ids() {
        let a = spawn_deferred("a", Duration::ZERO, || async { Ok::<_, String>(()) });
        let b = spawn_deferred("b", Duration::ZERO, || async { Ok::<_, String>(()) });
        assert_ne!(a.id(), b.id());
        assert_eq!(a.label(), "a");
        a.outcome().await;
        b.outcome().await;
    }
}
