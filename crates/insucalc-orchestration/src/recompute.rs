//! Recompute triggers: re-enrich existing rows without re-resolving.

use tracing::{debug, info, warn};

use insucalc_core::constants::MIN_AGE;
use insucalc_core::error::MatrixError;
use insucalc_core::row::RowKey;

use crate::orchestrator::{until_cancelled, Job, RecomputeSummary, SelectionOrchestrator};

impl SelectionOrchestrator {
    /// Change the insured age and re-enrich every row with it.
    ///
    /// The row set is unchanged and no top-level progress is reported. Rows
    /// still being enriched at the previous age are redone at this one.
    pub async fn set_age(&self, age: u32) -> Result<RecomputeSummary, MatrixError> {
        if age < MIN_AGE {
            return Err(MatrixError::InvalidInput(format!(
                "age {age} is below the minimum of {MIN_AGE}"
            )));
        }
        let (pricing, keys) = self.store().set_age(age);
        let summary = self.recompute(keys, Job::Full(pricing)).await?;
        info!(age, rows = summary.rows, failed = summary.failed_rows, "Age recompute settled");
        Ok(summary)
    }

    /// Change the base amount and re-run only the premium half for every row.
    ///
    /// Availability is left untouched; failed rows are tallied in the log.
    pub async fn set_base_amount(&self, amount: u64) -> Result<RecomputeSummary, MatrixError> {
        if amount == 0 {
            return Err(MatrixError::InvalidInput(
                "base amount must be positive".to_string(),
            ));
        }
        let (pricing, keys) = self.store().set_base_amount(amount);
        let summary = self.recompute(keys, Job::PremiumOnly(pricing)).await?;
        if summary.failed_rows > 0 {
            warn!(
                base_amount = amount,
                failed = summary.failed_rows,
                rows = summary.rows,
                "Premium recompute failed for some rows"
            );
        }
        Ok(summary)
    }

    /// Re-enrich the rows of one code at the current age and amount.
    pub async fn refresh_code(&self, code: &str) -> Result<RecomputeSummary, MatrixError> {
        let keys: Vec<RowKey> = self
            .store()
            .keys()
            .into_iter()
            .filter(|k| k.insu_cd == code)
            .collect();
        let summary = self.recompute(keys, Job::Full(self.store().pricing())).await?;
        debug!(code, rows = summary.rows, failed = summary.failed_rows, "Code refreshed");
        Ok(summary)
    }

    async fn recompute(&self, keys: Vec<RowKey>, job: Job) -> Result<RecomputeSummary, MatrixError> {
        if keys.is_empty() {
            return Ok(RecomputeSummary::default());
        }
        let token = self.store().current_token();
        until_cancelled(&token, self.fan_out(&token, keys, job, false, |_, _| Ok(()))).await
    }
}
