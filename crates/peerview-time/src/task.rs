//! Cancellable scheduled tasks

use std::future::Future;

use tokio::task::JoinHandle;

/// A spawned background task owned by exactly one monitor
///
/// Cancelling (explicitly or by dropping the handle) aborts the task at its
/// next suspension point, so no further scheduled work runs afterwards.
pub struct ScheduledTask {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl ScheduledTask {
    /// Spawn `future` on the current runtime
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::trace!(task = name, "scheduled task spawned");
        ScheduledTask {
            name,
            handle: Some(tokio::spawn(future)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the task is still scheduled
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the task; returns true if it was still pending
    ///
    /// Idempotent: cancelling an already cancelled task is a no-op.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                tracing::trace!(task = self.name, pending, "scheduled task cancelled");
                pending
            }
            None => false,
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
