//! Progress tracking types and operation tokens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Notify;

use crate::constants::{PROGRESS_ENRICH_BAND, PROGRESS_ROWS_PUBLISHED};

/// Phase of a selection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Resolving,
    Expanding,
    Enriching,
    Settled,
}

/// Progress update sent from the orchestrator to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Generation of the operation producing this update.
    pub generation: u64,
    /// Current phase.
    pub stage: Stage,
    /// Overall progress in percent, 0..=100.
    pub percent: u8,
    /// Rows whose enrichment has settled.
    pub completed_rows: usize,
    /// Rows in the matrix.
    pub total_rows: usize,
    /// Whether this is the final update of the operation.
    pub done: bool,
}

impl ProgressUpdate {
    /// Create a new progress update.
    #[must_use]
    pub fn new(generation: u64, stage: Stage, percent: u8) -> Self {
        Self {
            generation,
            stage,
            percent,
            completed_rows: 0,
            total_rows: 0,
            done: false,
        }
    }

    /// Attach row counters.
    #[must_use]
    pub fn with_rows(mut self, completed: usize, total: usize) -> Self {
        self.completed_rows = completed;
        self.total_rows = total;
        self
    }

    /// Create a completion update.
    #[must_use]
    pub fn done(generation: u64, total_rows: usize) -> Self {
        Self {
            generation,
            stage: Stage::Settled,
            percent: 100,
            completed_rows: total_rows,
            total_rows,
            done: true,
        }
    }
}

/// Map settled-row count into the enrichment band (30% to 90%).
///
/// ```
/// use insucalc_core::progress::enrichment_progress;
///
/// assert_eq!(enrichment_progress(0, 4), 30);
/// assert_eq!(enrichment_progress(2, 4), 60);
/// assert_eq!(enrichment_progress(4, 4), 90);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn enrichment_progress(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return PROGRESS_ROWS_PUBLISHED + PROGRESS_ENRICH_BAND;
    }
    let completed = completed.min(total);
    let band = usize::from(PROGRESS_ENRICH_BAND) * completed / total;
    PROGRESS_ROWS_PUBLISHED + band as u8
}

/// Token identifying one selection operation.
///
/// Every state write carries the token it was issued under; the store
/// discards writes whose generation is no longer current. Cancelling the
/// token also wakes every task parked on [`cancelled`](Self::cancelled),
/// so lookups still in flight are abandoned instead of awaited.
///
/// # Example
/// ```
/// use insucalc_core::progress::OperationToken;
///
/// let token = OperationToken::new(1);
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct OperationToken {
    generation: u64,
    signal: Arc<CancelSignal>,
}

#[derive(Debug, Default)]
struct CancelSignal {
    flag: AtomicBool,
    notify: Notify,
}

impl OperationToken {
    /// Create a token for the given generation.
    #[must_use]
    pub fn new(generation: u64) -> Self {
        Self {
            generation,
            signal: Arc::new(CancelSignal::default()),
        }
    }

    /// Generation this token was minted for.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.signal.flag.load(Ordering::Acquire)
    }

    /// Request cancellation and wake every waiter.
    pub fn cancel(&self) {
        self.signal.flag.store(true, Ordering::Release);
        self.signal.notify.notify_waiters();
    }

    /// Resolve once the token is cancelled.
    ///
    /// Returns immediately for a token that is already cancelled.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.signal.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_update_new() {
        let update = ProgressUpdate::new(3, Stage::Resolving, 10);
        assert_eq!(update.generation, 3);
        assert_eq!(update.percent, 10);
        assert!(!update.done);
    }

    #[test]
    fn progress_update_done() {
        let update = ProgressUpdate::done(1, 6);
        assert!(update.done);
        assert_eq!(update.percent, 100);
        assert_eq!(update.completed_rows, 6);
        assert_eq!(update.stage, Stage::Settled);
    }

    #[test]
    fn enrichment_band_bounds() {
        assert_eq!(enrichment_progress(0, 3), 30);
        assert_eq!(enrichment_progress(1, 3), 50);
        assert_eq!(enrichment_progress(3, 3), 90);
        assert_eq!(enrichment_progress(5, 3), 90);
        assert_eq!(enrichment_progress(0, 0), 90);
    }

    #[test]
    fn token_cancellation() {
        let token = OperationToken::new(7);
        assert_eq!(token.generation(), 7);
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_wakes_a_parked_waiter() {
        let token = OperationToken::new(1);
        let waiter = tokio::spawn({
            let token = token.clone();
            async move { token.cancelled().await }
        });
        tokio::task::yield_now().await;
        token.cancel();
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_returns_at_once_when_already_cancelled() {
        let token = OperationToken::new(1);
        token.cancel();
        token.cancelled().await;
    }

    #[test]
    fn cancellation_propagates_through_clone() {
        let token1 = OperationToken::new(1);
        let token2 = token1.clone();
        token1.cancel();
        assert!(token2.is_cancelled());
    }
}
