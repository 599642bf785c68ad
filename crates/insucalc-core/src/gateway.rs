//! The remote lookup seam.
//!
//! `LookupGateway` is the trait consumed by orchestration. Implementations
//! live in `insucalc-gateway` (HTTP and in-memory fixture).

use std::time::Duration;

use async_trait::async_trait;

use crate::product::{
    CodeEntry, ContractNotes, DataCheck, DocumentEntry, LimitInfo, MinMaxPremium, PremiumQuote,
    ProductInfo, RelatedCode,
};
use crate::row::RowKey;

/// Transport-level failure of one lookup.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// The request exceeded its timeout.
    #[error("request timed out after {timeout:?}: {url}")]
    Timeout { url: String, timeout: Duration },

    /// The backend could not be reached.
    #[error("backend unreachable: {url} ({reason})")]
    NetworkUnavailable { url: String, reason: String },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("invalid response payload: {0}")]
    Decode(String),
}

impl LookupError {
    /// Whether the backend answered with a 5xx status.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Status { status, .. } if *status >= 500)
    }
}

/// Query parameters identifying one priceable row variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    /// Insured age.
    pub age: u32,
    /// Insurance period.
    pub insu_term: String,
    /// Payment period.
    pub pay_term: String,
}

impl TermQuery {
    /// Build the query for a row at the given age.
    #[must_use]
    pub fn for_row(key: &RowKey, age: u32) -> Self {
        Self {
            age,
            insu_term: key.insu_term.clone(),
            pay_term: key.pay_term.clone(),
        }
    }
}

/// Backend lookups needed to build and enrich a matrix.
#[async_trait]
pub trait LookupGateway: Send + Sync {
    /// Product detail for one code.
    async fn product(&self, code: &str) -> Result<ProductInfo, LookupError>;

    /// Riders attached to a primary code, in source order.
    async fn related_codes(&self, code: &str) -> Result<Vec<RelatedCode>, LookupError>;

    /// Availability of the key, rate and premium tables for one term combination.
    async fn check_data(&self, code: &str, query: &TermQuery) -> Result<DataCheck, LookupError>;

    /// Male/female premium for one term combination and base amount.
    async fn premium_by_terms(
        &self,
        code: &str,
        query: &TermQuery,
        base_amount: u64,
    ) -> Result<PremiumQuote, LookupError>;

    /// Source documents known to the backend.
    async fn documents(&self) -> Result<Vec<DocumentEntry>, LookupError>;

    /// Main-contract codes found in one document.
    async fn main_codes(&self, document: &str) -> Result<Vec<CodeEntry>, LookupError>;

    /// Subscription limit of a code at an age.
    async fn limit(&self, code: &str, age: u32) -> Result<LimitInfo, LookupError>;

    /// Minimum and maximum premium of a code at an age.
    async fn min_max_premium(&self, code: &str, age: u32) -> Result<MinMaxPremium, LookupError>;

    /// Contract condition notes of a code.
    async fn contract_notes(&self, code: &str) -> Result<ContractNotes, LookupError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_detection() {
        let err = LookupError::Status {
            status: 500,
            body: "boom".into(),
        };
        assert!(err.is_server_error());

        let err = LookupError::Status {
            status: 404,
            body: String::new(),
        };
        assert!(!err.is_server_error());
        assert!(!LookupError::Decode("x".into()).is_server_error());
    }

    #[test]
    fn lookup_error_display() {
        let err = LookupError::Status {
            status: 503,
            body: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
    }

    #[test]
    fn term_query_from_row_key() {
        let key = RowKey::new("21686", "10년", "10년납");
        let query = TermQuery::for_row(&key, 40);
        assert_eq!(query.age, 40);
        assert_eq!(query.insu_term, "10년");
        assert_eq!(query.pay_term, "10년납");
    }
}
