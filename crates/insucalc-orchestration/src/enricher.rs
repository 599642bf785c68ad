//! Per-row enrichment: availability check and premium calculation.
//!
//! The two lookups of a row run concurrently and settle independently;
//! neither failure prevents the other from being merged.

use tracing::{debug, warn};

use insucalc_core::constants::{DIAG_CONNECTION_FAILED, DIAG_LOOKUP_FAILED, DIAG_SERVER_ERROR};
use insucalc_core::gateway::{LookupError, LookupGateway, TermQuery};
use insucalc_core::row::{Availability, CheckOutcome, PremiumOutcome, Row, RowKey};

/// Settled results of both lookups for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub check: CheckOutcome,
    pub premium: PremiumOutcome,
}

impl Enrichment {
    /// Merge both outcomes into `row`.
    pub fn apply(&self, row: &mut Row) {
        row.apply_check(&self.check);
        row.apply_premium(&self.premium);
    }

    /// Diagnostics of the lookups that failed, comma-joined.
    #[must_use]
    pub fn failure(&self) -> Option<String> {
        let parts: Vec<&str> = [check_failure(&self.check), premium_failure(&self.premium)]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

fn check_failure(outcome: &CheckOutcome) -> Option<&str> {
    match outcome {
        CheckOutcome::Failed { diagnostic } => Some(diagnostic.as_str()),
        CheckOutcome::Checked { .. } => None,
    }
}

/// Diagnostic of a failed premium calculation, if it failed.
#[must_use]
pub fn premium_failure(outcome: &PremiumOutcome) -> Option<&str> {
    match outcome {
        PremiumOutcome::Failed { diagnostic } => Some(diagnostic.as_str()),
        PremiumOutcome::Quoted { .. } => None,
    }
}

/// Map a transport failure to the row-level diagnostic shown to users.
#[must_use]
pub fn diagnose(err: &LookupError) -> String {
    match err {
        LookupError::NetworkUnavailable { .. } => DIAG_CONNECTION_FAILED.to_string(),
        e if e.is_server_error() => DIAG_SERVER_ERROR.to_string(),
        e => format!("{DIAG_LOOKUP_FAILED}: {e}"),
    }
}

/// Run the availability check for one row.
pub async fn check_row(gateway: &dyn LookupGateway, key: &RowKey, query: &TermQuery) -> CheckOutcome {
    match gateway.check_data(&key.insu_cd, query).await {
        Ok(check) => CheckOutcome::Checked {
            availability: Availability {
                reserve_key: check.rsv_key,
                reserve_rate: check.rsv_rate,
                premium_rate: check.prem_rate,
            },
            messages: check.errors,
        },
        Err(err) => {
            warn!(row = %key, error = %err, "Availability check failed");
            CheckOutcome::Failed {
                diagnostic: diagnose(&err),
            }
        }
    }
}

/// Run the premium calculation for one row.
pub async fn price_row(
    gateway: &dyn LookupGateway,
    key: &RowKey,
    query: &TermQuery,
    base_amount: u64,
) -> PremiumOutcome {
    match gateway.premium_by_terms(&key.insu_cd, query, base_amount).await {
        Ok(quote) => PremiumOutcome::Quoted {
            male: quote.man_premium,
            female: quote.fml_premium,
            messages: quote.errors,
        },
        Err(err) => {
            warn!(row = %key, error = %err, "Premium calculation failed");
            PremiumOutcome::Failed {
                diagnostic: diagnose(&err),
            }
        }
    }
}

/// Enrich one row: both lookups concurrently, each failure isolated.
pub async fn enrich_row(
    gateway: &dyn LookupGateway,
    key: &RowKey,
    age: u32,
    base_amount: u64,
) -> Enrichment {
    let query = TermQuery::for_row(key, age);
    let (check, premium) = tokio::join!(
        check_row(gateway, key, &query),
        price_row(gateway, key, &query, base_amount)
    );
    debug!(row = %key, age, base_amount, "Row enriched");
    Enrichment { check, premium }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insucalc_core::product::{DataCheck, PolicyTerms, ProductInfo};
    use insucalc_core::row::RowKind;
    use insucalc_gateway::{BackendFixture, Endpoint, FailureKind, FixtureGateway};
    use std::time::Duration;

    fn key() -> RowKey {
        RowKey::new("21686", "10년", "10년납")
    }

    fn row() -> Row {
        Row::from_terms(
            "21686",
            &ProductInfo::default(),
            &PolicyTerms::new("10년", "10년납", "15~80"),
            RowKind::Primary,
        )
    }

    fn full_check() -> DataCheck {
        DataCheck {
            rsv_key: true,
            rsv_rate: true,
            prem_rate: false,
            errors: vec!["보험료 테이블 없음".into()],
        }
    }

    #[test]
    fn diagnostics_distinguish_failure_kinds() {
        let network = LookupError::NetworkUnavailable {
            url: "u".into(),
            reason: "refused".into(),
        };
        assert_eq!(diagnose(&network), DIAG_CONNECTION_FAILED);

        let server = LookupError::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(diagnose(&server), DIAG_SERVER_ERROR);

        let timeout = LookupError::Timeout {
            url: "u".into(),
            timeout: Duration::from_secs(30),
        };
        assert!(diagnose(&timeout).starts_with(DIAG_LOOKUP_FAILED));

        let not_found = LookupError::Status {
            status: 404,
            body: "missing".into(),
        };
        assert_eq!(diagnose(&not_found), "데이터 조회 실패: HTTP 404: missing");
    }

    #[tokio::test]
    async fn both_lookups_merge() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_check("21686", full_check())
            .with_premium("21686", Some(12_000.0), Some(0.0));

        let enrichment = enrich_row(&gw, &key(), 30, 100).await;
        assert!(enrichment.failure().is_none());

        let mut r = row();
        enrichment.apply(&mut r);
        assert_eq!(r.availability().to_string(), "준비금키 Y/준비금 Y/보험료 N");
        assert_eq!(r.male_premium(), Some(12_000.0));
        assert_eq!(r.female_premium(), Some(0.0));
        assert_eq!(r.error(), Some("보험료 테이블 없음"));
    }

    #[tokio::test]
    async fn check_failure_does_not_block_premium() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_premium("21686", Some(5_000.0), Some(4_000.0))
            .with_failure(Endpoint::Check, None, FailureKind::Status {
                status: 500,
                body: "boom".into(),
            });

        let enrichment = enrich_row(&gw, &key(), 30, 100).await;
        assert_eq!(enrichment.failure().as_deref(), Some(DIAG_SERVER_ERROR));

        let mut r = row();
        enrichment.apply(&mut r);
        assert_eq!(r.availability(), Availability::absent());
        assert_eq!(r.male_premium(), Some(5_000.0));
        assert_eq!(r.error(), Some(DIAG_SERVER_ERROR));
    }

    #[tokio::test]
    async fn premium_failure_does_not_block_check() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_check("21686", full_check())
            .with_failure(Endpoint::Premium, None, FailureKind::Network);

        let enrichment = enrich_row(&gw, &key(), 30, 100).await;
        let mut r = row();
        enrichment.apply(&mut r);
        assert!(r.availability().reserve_key);
        assert!(r.male_premium().is_none());
        assert!(r.female_premium().is_none());
        assert_eq!(
            r.error(),
            Some("보험료 테이블 없음, 백엔드 서버 연결 실패")
        );
        assert_eq!(enrichment.failure().as_deref(), Some(DIAG_CONNECTION_FAILED));
    }

    #[tokio::test]
    async fn both_failures_are_joined() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_failure(Endpoint::Check, None, FailureKind::Network)
            .with_failure(Endpoint::Premium, None, FailureKind::Status {
                status: 500,
                body: String::new(),
            });
        let enrichment = enrich_row(&gw, &key(), 30, 100).await;
        assert_eq!(
            enrichment.failure().as_deref(),
            Some("백엔드 서버 연결 실패, 서버 내부 오류")
        );
    }

    #[tokio::test]
    async fn term_query_carries_row_identity() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_premium("21686", Some(1.0), None)
            .with_premium("21686|10년|10년납", Some(2.0), None);
        let outcome = price_row(&gw, &key(), &TermQuery::for_row(&key(), 15), 100).await;
        assert!(matches!(outcome, PremiumOutcome::Quoted { male: Some(m), .. } if (m - 2.0).abs() < f64::EPSILON));
    }
}
