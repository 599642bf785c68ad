//! Concrete observer implementations.

use crossbeam_channel::Sender;
use tracing::{debug, info};

use crate::observer::SelectionObserver;
use crate::progress::ProgressUpdate;
use crate::row::Row;

/// Observer that sends progress updates through a channel (non-blocking).
pub struct ChannelObserver {
    sender: Sender<ProgressUpdate>,
}

impl ChannelObserver {
    /// Create a new channel observer.
    #[must_use]
    pub fn new(sender: Sender<ProgressUpdate>) -> Self {
        Self { sender }
    }
}

impl SelectionObserver for ChannelObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        // A full or disconnected channel drops the update.
        let _ = self.sender.try_send(update.clone());
    }
}

/// Observer that logs selection events.
pub struct LoggingObserver;

impl LoggingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionObserver for LoggingObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        if update.done {
            info!(
                generation = update.generation,
                rows = update.total_rows,
                "Selection settled"
            );
        } else {
            debug!(
                generation = update.generation,
                stage = ?update.stage,
                progress = format!("{}%", update.percent),
                completed = update.completed_rows,
                total = update.total_rows,
                "Progress update"
            );
        }
    }

    fn on_rows_published(&self, generation: u64, rows: &[Row]) {
        info!(generation, rows = rows.len(), "Matrix published");
    }

    fn on_row_updated(&self, generation: u64, row: &Row) {
        debug!(
            generation,
            row = %row.key(),
            availability = %row.availability(),
            error = row.error().unwrap_or(""),
            "Row updated"
        );
    }
}
