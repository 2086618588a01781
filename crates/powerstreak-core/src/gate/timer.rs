//! One-shot reopen timer.
//!
//! Holds at most one pending task. Scheduling again replaces (and aborts)
//! the previous task, and dropping the timer cancels whatever is pending,
//! so a callback never outlives the session that scheduled it.

use chrono::Duration;
use std::future::Future;
use std::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Cancellable one-shot timer backed by a tokio task
#[derive(Debug, Default)]
pub struct GateTimer {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl GateTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `on_fire` once `after` has elapsed, replacing any pending callback.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, after: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = after.to_std().unwrap_or(std::time::Duration::ZERO);
        debug!(delay_ms = delay.as_millis() as u64, "scheduling gate reopen");

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire.await;
        });

        let previous = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Abort the pending callback. Returns whether one was still pending.
    pub fn cancel(&self) -> bool {
        let pending = self.handle.lock().unwrap_or_else(|e| e.into_inner()).take();
        match pending {
            Some(task) if !task.is_finished() => {
                task.abort();
                debug!("gate reopen timer cancelled");
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for GateTimer {
    fn drop(&mut self) {
        if let Some(task) = self.handle.get_mut().unwrap_or_else(|e| e.into_inner()).take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn bump(fired: &Arc<AtomicU32>) -> impl Future<Output = ()> + Send + 'static {
        let fired = fired.clone();
        async move {
            fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_at_boundary() {
        let timer = GateTimer::new();
        let fired = Arc::new(AtomicU32::new(0));
        timer.schedule(Duration::seconds(5), bump(&fired));

        tokio::time::sleep(std::time::Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(timer.is_pending());

        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!timer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_pending_callback() {
        let timer = GateTimer::new();
        let fired = Arc::new(AtomicU32::new(0));
        timer.schedule(Duration::seconds(5), bump(&fired));
        timer.schedule(Duration::seconds(10), bump(&fired));

        tokio::time::sleep(std::time::Duration::from_secs(6)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_and_drop_prevent_firing() {
        let fired = Arc::new(AtomicU32::new(0));

        let timer = GateTimer::new();
        timer.schedule(Duration::seconds(1), bump(&fired));
        assert!(timer.cancel());
        assert!(!timer.cancel());

        let dropped = GateTimer::new();
        dropped.schedule(Duration::seconds(1), bump(&fired));
        drop(dropped);

        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
