//! Selection orchestration: resolve, expand, enrich, settle.
//!
//! One `select_primary_code` call drives the state machine
//! `Idle → Resolving → Expanding → Enriching → Settled` for one
//! operation token. Every write goes through the [`MatrixStore`] under that
//! token, so a superseded operation can never touch a newer matrix.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use insucalc_core::constants::{
    PROGRESS_PRIMARY_LOADED, PROGRESS_RELATED_RESOLVED, PROGRESS_ROWS_PUBLISHED,
    SLOW_OPERATION_MS, SLOW_ROW_MS,
};
use insucalc_core::error::MatrixError;
use insucalc_core::gateway::{LookupError, LookupGateway, TermQuery};
use insucalc_core::observer::{ObserverSet, SelectionObserver};
use insucalc_core::options::SelectionDefaults;
use insucalc_core::progress::{enrichment_progress, OperationToken, ProgressUpdate, Stage};
use insucalc_core::row::{PremiumOutcome, Row, RowKey, RowKind};

use crate::enricher::{self, Enrichment};
use crate::expander;
use crate::resolver;
use crate::store::{MatrixSnapshot, MatrixStore, Merge, Pricing};

/// Summary of one settled selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSummary {
    pub generation: u64,
    pub rows: usize,
    /// Rows where at least one lookup failed.
    pub failed_rows: usize,
    /// Entries in the advisory error list at settlement.
    pub errors: usize,
    pub elapsed: Duration,
}

/// Tally of one fan-out over existing rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub rows: usize,
    pub failed_rows: usize,
}

/// What to fetch for each row of a fan-out, and at which pricing.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Job {
    /// Availability check and premium.
    Full(Pricing),
    /// Premium only; availability stays as it is.
    PremiumOnly(Pricing),
}

enum JobOutcome {
    Full(Enrichment),
    Premium(PremiumOutcome),
}

impl Job {
    fn pricing(self) -> Pricing {
        match self {
            Self::Full(pricing) | Self::PremiumOnly(pricing) => pricing,
        }
    }

    /// Same job at another pricing.
    fn repriced(self, pricing: Pricing) -> Self {
        match self {
            Self::Full(_) => Self::Full(pricing),
            Self::PremiumOnly(_) => Self::PremiumOnly(pricing),
        }
    }

    async fn run(self, gateway: &dyn LookupGateway, key: &RowKey) -> JobOutcome {
        match self {
            Self::Full(p) => {
                JobOutcome::Full(enricher::enrich_row(gateway, key, p.age, p.base_amount).await)
            }
            Self::PremiumOnly(p) => {
                let query = TermQuery::for_row(key, p.age);
                JobOutcome::Premium(enricher::price_row(gateway, key, &query, p.base_amount).await)
            }
        }
    }
}

async fn run_job(
    gateway: Arc<dyn LookupGateway>,
    job: Job,
    key: RowKey,
) -> (RowKey, Job, JobOutcome, Duration) {
    let start = Instant::now();
    let outcome = job.run(&*gateway, &key).await;
    (key, job, outcome, start.elapsed())
}

/// Drive `work` until it finishes or `token` is cancelled.
///
/// On cancellation the lookups still in flight are dropped, not awaited.
pub(crate) async fn until_cancelled<T, F>(token: &OperationToken, work: F) -> Result<T, MatrixError>
where
    F: Future<Output = Result<T, MatrixError>>,
{
    tokio::select! {
        biased;
        () = token.cancelled() => Err(MatrixError::Superseded),
        result = work => result,
    }
}

impl JobOutcome {
    fn apply(&self, row: &mut Row) {
        match self {
            Self::Full(enrichment) => enrichment.apply(row),
            Self::Premium(premium) => row.apply_premium(premium),
        }
    }

    fn failure(&self) -> Option<String> {
        match self {
            Self::Full(enrichment) => enrichment.failure(),
            Self::Premium(premium) => enricher::premium_failure(premium).map(str::to_string),
        }
    }
}

/// Drives selections and recomputes over a shared store.
///
/// Cheap to clone; clones share the gateway, store and observers.
#[derive(Clone)]
pub struct SelectionOrchestrator {
    gateway: Arc<dyn LookupGateway>,
    store: Arc<MatrixStore>,
    observers: Arc<ObserverSet>,
}

impl SelectionOrchestrator {
    #[must_use]
    pub fn new(gateway: Arc<dyn LookupGateway>, defaults: SelectionDefaults) -> Self {
        Self {
            gateway,
            store: Arc::new(MatrixStore::new(defaults)),
            observers: Arc::new(ObserverSet::new()),
        }
    }

    /// Register an observer for progress and row events.
    pub fn register(&self, observer: Arc<dyn SelectionObserver>) {
        self.observers.register(observer);
    }

    #[must_use]
    pub fn store(&self) -> &MatrixStore {
        &self.store
    }

    #[must_use]
    pub fn gateway(&self) -> &dyn LookupGateway {
        &*self.gateway
    }

    #[must_use]
    pub fn snapshot(&self) -> MatrixSnapshot {
        self.store.snapshot()
    }

    /// Select a primary code and build its matrix.
    ///
    /// Returns `Superseded` as soon as the operation's token is cancelled,
    /// either by a newer selection or by the caller, without waiting for the
    /// lookups in flight. Returns `PrimaryUnavailable` if the primary detail
    /// could not be fetched (the operation still settles, with an empty
    /// matrix).
    pub async fn select_primary_code(&self, code: &str) -> Result<SelectionSummary, MatrixError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(MatrixError::InvalidInput("product code is empty".to_string()));
        }

        let token = self.store.begin_selection(code);
        info!(code, generation = token.generation(), "Selection started");
        until_cancelled(&token, self.run_selection(&token, code)).await
    }

    async fn run_selection(
        &self,
        token: &OperationToken,
        code: &str,
    ) -> Result<SelectionSummary, MatrixError> {
        let start = Instant::now();
        let generation = token.generation();
        self.report(token, Stage::Resolving, 0)?;

        let gateway = &*self.gateway;
        let (detail, resolution) = tokio::join!(
            async {
                let detail = gateway.product(code).await;
                if detail.is_ok() {
                    // A stale token surfaces after the join.
                    self.report(token, Stage::Resolving, PROGRESS_PRIMARY_LOADED).ok();
                }
                detail
            },
            resolver::resolve_related(gateway, code),
        );

        let product = match detail {
            Ok(product) => product,
            Err(source) => return self.fail_primary(token, code, source),
        };

        if let Some(err) = resolution.error {
            self.store.push_error(token, err.to_string())?;
        }
        self.store.set_related(token, &resolution.codes)?;
        self.report(token, Stage::Expanding, PROGRESS_RELATED_RESOLVED)?;

        let primary_rows = expander::expand(code, &product, RowKind::Primary);
        let related = expander::expand_related(gateway, &resolution.codes).await;
        for gap in &related.gaps {
            self.store.push_error(token, gap.to_string())?;
        }
        let rows = expander::assemble(primary_rows, related.rows);
        let total = rows.len();
        let keys: Vec<RowKey> = rows.iter().map(|r| r.key().clone()).collect();

        let pricing = self.store.publish_rows(token, rows.clone())?;
        self.observers.notify_published(generation, &rows);
        self.report_rows(token, 0, total)?;

        let tally = self
            .fan_out(token, keys, Job::Full(pricing), true, |completed, total| {
                self.report_rows(token, completed, total)
            })
            .await?;

        self.store.settle(token)?;
        self.observers
            .notify_progress(&ProgressUpdate::done(generation, total));

        let elapsed = start.elapsed();
        if elapsed.as_millis() > SLOW_OPERATION_MS {
            warn!(code, generation, elapsed_ms = elapsed.as_millis(), "Slow selection");
        }
        let errors = self.store.errors().len();
        info!(
            code,
            generation,
            rows = total,
            failed = tally.failed_rows,
            errors,
            elapsed_ms = elapsed.as_millis(),
            "Selection settled"
        );

        Ok(SelectionSummary {
            generation,
            rows: total,
            failed_rows: tally.failed_rows,
            errors,
            elapsed,
        })
    }

    fn fail_primary(
        &self,
        token: &OperationToken,
        code: &str,
        source: LookupError,
    ) -> Result<SelectionSummary, MatrixError> {
        let err = MatrixError::PrimaryUnavailable {
            code: code.to_string(),
            source,
        };
        warn!(code, generation = token.generation(), error = %err, "Primary detail unavailable");
        self.store.push_error(token, err.to_string())?;
        self.store.settle(token)?;
        self.observers
            .notify_progress(&ProgressUpdate::done(token.generation(), 0));
        Err(err)
    }

    fn report(&self, token: &OperationToken, stage: Stage, percent: u8) -> Result<(), MatrixError> {
        let effective = self.store.advance_progress(token, percent)?;
        self.observers
            .notify_progress(&ProgressUpdate::new(token.generation(), stage, effective));
        Ok(())
    }

    fn report_rows(
        &self,
        token: &OperationToken,
        completed: usize,
        total: usize,
    ) -> Result<(), MatrixError> {
        let effective = self
            .store
            .advance_progress(token, enrichment_progress(completed, total))?;
        self.observers.notify_progress(
            &ProgressUpdate::new(token.generation(), Stage::Enriching, effective)
                .with_rows(completed, total),
        );
        Ok(())
    }

    /// Run `job` for every key concurrently and merge each row as it settles.
    ///
    /// Rows settle in network order; `on_settled` sees the running count.
    /// A row priced under an epoch the store has since left is looked up
    /// again at the current pricing instead of being merged. Stops with
    /// `Superseded` at the first write the store rejects.
    pub(crate) async fn fan_out<F>(
        &self,
        token: &OperationToken,
        keys: Vec<RowKey>,
        job: Job,
        record_failures: bool,
        mut on_settled: F,
    ) -> Result<RecomputeSummary, MatrixError>
    where
        F: FnMut(usize, usize) -> Result<(), MatrixError>,
    {
        let total = keys.len();
        let mut pending: FuturesUnordered<_> = keys
            .into_iter()
            .map(|key| run_job(Arc::clone(&self.gateway), job, key))
            .collect();

        let mut completed = 0;
        let mut failed_rows = 0;
        while let Some((key, job, outcome, elapsed)) = pending.next().await {
            if elapsed.as_millis() > SLOW_ROW_MS {
                warn!(row = %key, elapsed_ms = elapsed.as_millis(), "Slow row");
            }

            let epoch = job.pricing().epoch;
            match self.store.merge_row(token, epoch, &key, |row| outcome.apply(row))? {
                Merge::Patched(row) => self.observers.notify_row(token.generation(), &row),
                Merge::Missing => debug!(row = %key, "Row no longer in matrix"),
                Merge::Stale(pricing) => {
                    debug!(row = %key, epoch, current = pricing.epoch, "Row priced at an old epoch");
                    pending.push(run_job(Arc::clone(&self.gateway), job.repriced(pricing), key));
                    continue;
                }
            }

            completed += 1;
            if let Some(message) = outcome.failure() {
                failed_rows += 1;
                if record_failures {
                    self.store
                        .push_error(token, MatrixError::Enrichment { key, message }.to_string())?;
                }
            }
            on_settled(completed, total)?;
        }

        Ok(RecomputeSummary {
            rows: total,
            failed_rows,
        })
    }
}
