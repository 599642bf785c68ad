//! Orchestration interfaces.

use insucalc_core::observer::SelectionObserver;
use insucalc_core::product::DocumentEntry;
use insucalc_core::progress::ProgressUpdate;

use crate::catalog::{CodeInspection, CodeListing};
use crate::store::MatrixSnapshot;

/// Trait for reporting progress to the user.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update.
    fn report(&self, update: &ProgressUpdate);

    /// Report completion.
    fn complete(&self);
}

/// Trait for presenting results to the user.
pub trait MatrixPresenter: Send + Sync {
    /// Present a settled (or partial) matrix with its selection state.
    fn present_matrix(&self, snapshot: &MatrixSnapshot);

    /// Present the document catalog.
    fn present_documents(&self, documents: &[DocumentEntry]);

    /// Present the main codes of one document.
    fn present_codes(&self, listing: &CodeListing);

    /// Present a single-code inspection.
    fn present_inspection(&self, inspection: &CodeInspection);

    /// Present an error.
    fn present_error(&self, error: &str);
}

/// Adapts a [`ProgressReporter`] to the selection observer seam.
pub struct ReporterObserver<R> {
    reporter: R,
}

impl<R: ProgressReporter> ReporterObserver<R> {
    #[must_use]
    pub fn new(reporter: R) -> Self {
        Self { reporter }
    }
}

impl<R: ProgressReporter> SelectionObserver for ReporterObserver<R> {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.reporter.report(update);
        if update.done {
            self.reporter.complete();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use insucalc_core::progress::Stage;

    use super::*;

    #[derive(Default)]
    struct Counting {
        reports: AtomicUsize,
        completes: AtomicUsize,
    }

    impl ProgressReporter for Arc<Counting> {
        fn report(&self, _update: &ProgressUpdate) {
            self.reports.fetch_add(1, Ordering::Relaxed);
        }

        fn complete(&self) {
            self.completes.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn observer_completes_on_final_update() {
        let counting = Arc::new(Counting::default());
        let observer = ReporterObserver::new(counting.clone());
        observer.on_progress(&ProgressUpdate::new(1, Stage::Enriching, 60));
        observer.on_progress(&ProgressUpdate::done(1, 3));
        assert_eq!(counting.reports.load(Ordering::Relaxed), 2);
        assert_eq!(counting.completes.load(Ordering::Relaxed), 1);
    }
}
