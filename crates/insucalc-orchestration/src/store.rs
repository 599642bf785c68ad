//! Owned matrix and selection state.
//!
//! All mutation goes through narrow operations that carry the
//! [`OperationToken`] they were issued under. A write whose token is no
//! longer current returns [`MatrixError::Superseded`] and changes nothing.
//! Row merges are keyed by [`RowKey`], never by position, and carry the
//! [`Pricing`] epoch their lookups were issued at.

use parking_lot::Mutex;
use serde::Serialize;

use insucalc_core::constants::PROGRESS_DONE;
use insucalc_core::error::MatrixError;
use insucalc_core::options::SelectionDefaults;
use insucalc_core::progress::OperationToken;
use insucalc_core::row::{Row, RowKey};

/// Point-in-time copy of the selection state and its matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixSnapshot {
    pub generation: u64,
    pub primary_code: Option<String>,
    pub related_codes: Vec<String>,
    pub age: u32,
    pub base_amount: u64,
    pub is_loading: bool,
    pub progress: u8,
    pub errors: Vec<String>,
    pub rows: Vec<Row>,
}

/// Age and base amount rows are priced at.
///
/// `epoch` moves on every age or base-amount change, so a lookup issued
/// under an older epoch can be told apart from one issued under the
/// current parameters even when the values coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pricing {
    pub age: u32,
    pub base_amount: u64,
    pub epoch: u64,
}

/// Result of [`MatrixStore::merge_row`].
#[derive(Debug, Clone, PartialEq)]
pub enum Merge {
    /// The row was patched; a copy of it.
    Patched(Row),
    /// No row has that key.
    Missing,
    /// The patch was priced under an older epoch and was not applied.
    Stale(Pricing),
}

struct Inner {
    token: OperationToken,
    primary_code: Option<String>,
    related_codes: Vec<String>,
    pricing: Pricing,
    is_loading: bool,
    progress: u8,
    errors: Vec<String>,
    rows: Vec<Row>,
}

impl Inner {
    fn guard(&self, token: &OperationToken) -> Result<(), MatrixError> {
        if token.generation() == self.token.generation() && !token.is_cancelled() {
            Ok(())
        } else {
            Err(MatrixError::Superseded)
        }
    }

    fn bump_epoch(&mut self) -> (Pricing, Vec<RowKey>) {
        self.pricing.epoch += 1;
        let keys = self.rows.iter().map(|r| r.key().clone()).collect();
        (self.pricing, keys)
    }
}

/// The single active matrix and its selection state.
pub struct MatrixStore {
    inner: Mutex<Inner>,
}

impl MatrixStore {
    #[must_use]
    pub fn new(defaults: SelectionDefaults) -> Self {
        let defaults = defaults.normalize();
        Self {
            inner: Mutex::new(Inner {
                token: OperationToken::new(0),
                primary_code: None,
                related_codes: Vec::new(),
                pricing: Pricing {
                    age: defaults.age,
                    base_amount: defaults.base_amount,
                    epoch: 0,
                },
                is_loading: false,
                progress: 0,
                errors: Vec::new(),
                rows: Vec::new(),
            }),
        }
    }

    /// Start a new selection: cancel the previous operation, clear the
    /// matrix and errors, reset progress, and mint a fresh token.
    pub fn begin_selection(&self, code: &str) -> OperationToken {
        let mut inner = self.inner.lock();
        inner.token.cancel();
        let token = OperationToken::new(inner.token.generation() + 1);
        inner.token = token.clone();
        inner.primary_code = Some(code.to_string());
        inner.related_codes.clear();
        inner.rows.clear();
        inner.errors.clear();
        inner.progress = 0;
        inner.is_loading = true;
        token
    }

    /// Token of the active selection.
    #[must_use]
    pub fn current_token(&self) -> OperationToken {
        self.inner.lock().token.clone()
    }

    /// Record the related codes resolved for the active primary code.
    pub fn set_related(&self, token: &OperationToken, codes: &[String]) -> Result<(), MatrixError> {
        let mut inner = self.inner.lock();
        inner.guard(token)?;
        inner.related_codes = codes.to_vec();
        Ok(())
    }

    /// Replace the matrix wholesale. Only valid before enrichment starts.
    ///
    /// Returns the pricing the new rows must be enriched at. A later age or
    /// base-amount change sees the published keys.
    pub fn publish_rows(&self, token: &OperationToken, rows: Vec<Row>) -> Result<Pricing, MatrixError> {
        let mut inner = self.inner.lock();
        inner.guard(token)?;
        inner.rows = rows;
        Ok(inner.pricing)
    }

    /// Patch the row identified by `key` in place.
    ///
    /// Patches priced under an epoch older than the current one are refused
    /// with [`Merge::Stale`], which carries the pricing to retry at.
    pub fn merge_row<F>(
        &self,
        token: &OperationToken,
        epoch: u64,
        key: &RowKey,
        patch: F,
    ) -> Result<Merge, MatrixError>
    where
        F: FnOnce(&mut Row),
    {
        let mut inner = self.inner.lock();
        inner.guard(token)?;
        if epoch < inner.pricing.epoch {
            return Ok(Merge::Stale(inner.pricing));
        }
        Ok(inner
            .rows
            .iter_mut()
            .find(|row| row.key() == key)
            .map_or(Merge::Missing, |row| {
                patch(row);
                Merge::Patched(row.clone())
            }))
    }

    /// Raise progress to `percent`. Lower values are ignored; the effective
    /// progress is returned. Completion is reserved for [`settle`](Self::settle).
    pub fn advance_progress(&self, token: &OperationToken, percent: u8) -> Result<u8, MatrixError> {
        let mut inner = self.inner.lock();
        inner.guard(token)?;
        let capped = percent.min(PROGRESS_DONE - 1);
        inner.progress = inner.progress.max(capped);
        Ok(inner.progress)
    }

    /// Append an advisory message to the error list.
    pub fn push_error(&self, token: &OperationToken, message: String) -> Result<(), MatrixError> {
        let mut inner = self.inner.lock();
        inner.guard(token)?;
        inner.errors.push(message);
        Ok(())
    }

    /// Finish the operation: progress 100, loading off.
    ///
    /// Returns `false` if the operation had already settled.
    pub fn settle(&self, token: &OperationToken) -> Result<bool, MatrixError> {
        let mut inner = self.inner.lock();
        inner.guard(token)?;
        if !inner.is_loading && inner.progress == PROGRESS_DONE {
            return Ok(false);
        }
        inner.progress = PROGRESS_DONE;
        inner.is_loading = false;
        Ok(true)
    }

    #[must_use]
    pub fn snapshot(&self) -> MatrixSnapshot {
        let inner = self.inner.lock();
        MatrixSnapshot {
            generation: inner.token.generation(),
            primary_code: inner.primary_code.clone(),
            related_codes: inner.related_codes.clone(),
            age: inner.pricing.age,
            base_amount: inner.pricing.base_amount,
            is_loading: inner.is_loading,
            progress: inner.progress,
            errors: inner.errors.clone(),
            rows: inner.rows.clone(),
        }
    }

    /// Copy of the current rows, in matrix order.
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        self.inner.lock().rows.clone()
    }

    /// Keys of the current rows, in matrix order.
    #[must_use]
    pub fn keys(&self) -> Vec<RowKey> {
        self.inner.lock().rows.iter().map(|r| r.key().clone()).collect()
    }

    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.inner.lock().errors.clone()
    }

    #[must_use]
    pub fn pricing(&self) -> Pricing {
        self.inner.lock().pricing
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.inner.lock().pricing.age
    }

    #[must_use]
    pub fn base_amount(&self) -> u64 {
        self.inner.lock().pricing.base_amount
    }

    /// Change the age and open a new pricing epoch.
    ///
    /// Returns the new pricing with the keys of the rows to re-enrich.
    pub fn set_age(&self, age: u32) -> (Pricing, Vec<RowKey>) {
        let mut inner = self.inner.lock();
        inner.pricing.age = age;
        inner.bump_epoch()
    }

    /// Change the base amount and open a new pricing epoch.
    pub fn set_base_amount(&self, amount: u64) -> (Pricing, Vec<RowKey>) {
        let mut inner = self.inner.lock();
        inner.pricing.base_amount = amount;
        inner.bump_epoch()
    }
}

impl Default for MatrixStore {
    fn default() -> Self {
        Self::new(SelectionDefaults::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insucalc_core::row::{Availability, CheckOutcome, RowKind};

    fn row(code: &str, insu: &str) -> Row {
        let product = insucalc_core::product::ProductInfo::default();
        Row::from_terms(
            code,
            &product,
            &insucalc_core::product::PolicyTerms::new(insu, "10년납", "15~80"),
            RowKind::Related,
        )
    }

    #[test]
    fn begin_selection_resets_state() {
        let store = MatrixStore::default();
        let first = store.begin_selection("21686");
        store.publish_rows(&first, vec![row("21686", "10년")]).unwrap();
        store.push_error(&first, "boom".into()).unwrap();
        store.advance_progress(&first, 50).unwrap();

        let second = store.begin_selection("21704");
        let snap = store.snapshot();
        assert_eq!(snap.generation, second.generation());
        assert_eq!(snap.primary_code.as_deref(), Some("21704"));
        assert!(snap.rows.is_empty());
        assert!(snap.errors.is_empty());
        assert_eq!(snap.progress, 0);
        assert!(snap.is_loading);
        assert!(first.is_cancelled());
    }

    #[test]
    fn stale_writes_are_discarded() {
        let store = MatrixStore::default();
        let stale = store.begin_selection("X");
        let current = store.begin_selection("Y");
        store.publish_rows(&current, vec![row("Y", "10년")]).unwrap();

        let key = RowKey::new("Y", "10년", "10년납");
        let result = store.merge_row(&stale, 0, &key, |r| {
            r.apply_check(&CheckOutcome::Checked {
                availability: Availability {
                    reserve_key: true,
                    reserve_rate: true,
                    premium_rate: true,
                },
                messages: vec![],
            });
        });
        assert!(matches!(result, Err(MatrixError::Superseded)));
        assert!(matches!(
            store.publish_rows(&stale, vec![row("X", "10년")]),
            Err(MatrixError::Superseded)
        ));
        assert!(store.push_error(&stale, "late".into()).is_err());
        assert!(store.settle(&stale).is_err());

        let snap = store.snapshot();
        assert_eq!(snap.rows.len(), 1);
        assert_eq!(snap.rows[0].availability(), Availability::absent());
        assert!(snap.errors.is_empty());
    }

    #[test]
    fn merges_are_keyed_by_identity() {
        let store = MatrixStore::default();
        let token = store.begin_selection("21686");
        store
            .publish_rows(&token, vec![row("21686", "10년"), row("21686", "20년")])
            .unwrap();

        let key = RowKey::new("21686", "20년", "10년납");
        let merged = store
            .merge_row(&token, 0, &key, |r| {
                r.apply_check(&CheckOutcome::Failed {
                    diagnostic: "서버 내부 오류".into(),
                });
            })
            .unwrap();
        let Merge::Patched(patched) = merged else {
            panic!("expected a patched row, got {merged:?}");
        };
        assert_eq!(patched.key(), &key);

        let rows = store.rows();
        assert!(rows[0].error().is_none());
        assert_eq!(rows[1].error(), Some("서버 내부 오류"));

        let missing = RowKey::new("99999", "—", "—");
        assert_eq!(store.merge_row(&token, 0, &missing, |_| {}).unwrap(), Merge::Missing);
    }

    #[test]
    fn progress_is_monotonic_and_completes_once() {
        let store = MatrixStore::default();
        let token = store.begin_selection("21686");
        assert_eq!(store.advance_progress(&token, 20).unwrap(), 20);
        assert_eq!(store.advance_progress(&token, 10).unwrap(), 20);
        assert_eq!(store.advance_progress(&token, 100).unwrap(), 99);
        assert!(store.settle(&token).unwrap());
        assert!(!store.settle(&token).unwrap());

        let snap = store.snapshot();
        assert_eq!(snap.progress, 100);
        assert!(!snap.is_loading);
    }

    #[test]
    fn defaults_are_normalized() {
        let store = MatrixStore::new(SelectionDefaults {
            age: 0,
            base_amount: 0,
        });
        assert_eq!(store.age(), 15);
        assert_eq!(store.base_amount(), 100);
        store.set_age(40);
        store.set_base_amount(200);
        assert_eq!(store.snapshot().age, 40);
        assert_eq!(store.snapshot().base_amount, 200);
        assert_eq!(store.pricing().epoch, 2);
    }

    #[test]
    fn patches_from_an_older_epoch_are_refused() {
        let store = MatrixStore::default();
        let token = store.begin_selection("21686");
        let published = store.publish_rows(&token, vec![row("21686", "10년")]).unwrap();
        assert_eq!(published.age, 15);

        let (pricing, keys) = store.set_age(40);
        assert_eq!(pricing.epoch, published.epoch + 1);
        assert_eq!(keys, vec![RowKey::new("21686", "10년", "10년납")]);

        let failed = CheckOutcome::Failed {
            diagnostic: "old".into(),
        };
        let merged = store
            .merge_row(&token, published.epoch, &keys[0], |r| r.apply_check(&failed))
            .unwrap();
        assert_eq!(merged, Merge::Stale(pricing));
        assert!(store.rows()[0].error().is_none());

        let merged = store
            .merge_row(&token, pricing.epoch, &keys[0], |r| r.apply_check(&failed))
            .unwrap();
        assert!(matches!(merged, Merge::Patched(_)));
    }
}
