//! # insucalc-orchestration
//!
//! Selection resolution, row expansion, concurrent enrichment, recompute
//! triggers and the matrix store.

pub mod catalog;
pub mod enricher;
pub mod expander;
pub mod interfaces;
pub mod orchestrator;
pub mod recompute;
pub mod refresh;
pub mod resolver;
pub mod store;

pub use catalog::{CodeInspection, CodeListing};
pub use interfaces::{MatrixPresenter, ProgressReporter, ReporterObserver};
pub use orchestrator::{RecomputeSummary, SelectionOrchestrator, SelectionSummary};
pub use refresh::RefreshScheduler;
pub use store::{MatrixSnapshot, MatrixStore};
