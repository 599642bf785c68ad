//! Observer pattern for selection progress and matrix changes.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::progress::ProgressUpdate;
use crate::row::Row;

/// Observer trait for receiving selection events.
pub trait SelectionObserver: Send + Sync {
    /// Receive a progress update.
    fn on_progress(&self, update: &ProgressUpdate);

    /// The expanded matrix was published, before any enrichment.
    fn on_rows_published(&self, _generation: u64, _rows: &[Row]) {}

    /// One row was patched in place.
    fn on_row_updated(&self, _generation: u64, _row: &Row) {}
}

/// Subject that manages a collection of observers.
pub struct ObserverSet {
    observers: RwLock<Vec<Arc<dyn SelectionObserver>>>,
}

impl ObserverSet {
    /// Create a new subject with no observers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Arc<dyn SelectionObserver>) {
        self.observers.write().push(observer);
    }

    /// Notify all observers of a progress update.
    pub fn notify_progress(&self, update: &ProgressUpdate) {
        for observer in self.observers.read().iter() {
            observer.on_progress(update);
        }
    }

    /// Notify all observers that the matrix was published.
    pub fn notify_published(&self, generation: u64, rows: &[Row]) {
        for observer in self.observers.read().iter() {
            observer.on_rows_published(generation, rows);
        }
    }

    /// Notify all observers that a row changed.
    pub fn notify_row(&self, generation: u64, row: &Row) {
        for observer in self.observers.read().iter() {
            observer.on_row_updated(generation, row);
        }
    }
}

impl Default for ObserverSet {
    fn default() -> Self {
        Self::new()
    }
}
