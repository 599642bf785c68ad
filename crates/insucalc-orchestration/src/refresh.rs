//! Debounced follow-up refresh of one code's rows.
//!
//! At most one refresh is pending at a time: scheduling again aborts the
//! pending timer and starts a new one.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::orchestrator::SelectionOrchestrator;

/// Default debounce delay.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(1500);

pub struct RefreshScheduler {
    orchestrator: SelectionOrchestrator,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(orchestrator: SelectionOrchestrator, delay: Duration) -> Self {
        Self {
            orchestrator,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedule a refresh of `code` after the debounce delay.
    ///
    /// With `suppress` set nothing is scheduled. Must be called from within
    /// a tokio runtime. Returns whether a refresh was scheduled.
    pub fn schedule(&self, code: &str, suppress: bool) -> bool {
        if suppress {
            debug!(code, "Refresh suppressed");
            return false;
        }

        let orchestrator = self.orchestrator.clone();
        let delay = self.delay;
        let code = code.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match orchestrator.refresh_code(&code).await {
                Ok(summary) => debug!(code, rows = summary.rows, "Scheduled refresh done"),
                Err(err) => debug!(code, error = %err, "Scheduled refresh dropped"),
            }
        });

        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.abort();
        }
        true
    }

    /// Abort the pending refresh, if any. Returns whether one was pending.
    pub fn cancel(&self) -> bool {
        match self.pending.lock().take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
