//! Related-code resolution for a primary code.

use std::collections::HashSet;

use tracing::{debug, warn};

use insucalc_core::error::MatrixError;
use insucalc_core::gateway::LookupGateway;

/// Outcome of resolving a primary code's riders.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// De-duplicated related codes in source order. Never contains the primary code.
    pub codes: Vec<String>,
    /// Set when the lookup failed and the matrix degrades to primary-only.
    pub error: Option<MatrixError>,
}

/// Discover the related codes of `primary`.
///
/// A failed lookup yields an empty list plus one diagnostic.
pub async fn resolve_related(gateway: &dyn LookupGateway, primary: &str) -> Resolution {
    match gateway.related_codes(primary).await {
        Ok(related) => {
            let mut seen = HashSet::new();
            let codes: Vec<String> = related
                .into_iter()
                .map(|r| r.insu_cd.trim().to_string())
                .filter(|code| !code.is_empty() && code != primary)
                .filter(|code| seen.insert(code.clone()))
                .collect();
            debug!(primary, count = codes.len(), "Related codes resolved");
            Resolution { codes, error: None }
        }
        Err(source) => {
            warn!(primary, error = %source, "Related code lookup failed");
            Resolution {
                codes: Vec::new(),
                error: Some(MatrixError::Resolution {
                    code: primary.to_string(),
                    source,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insucalc_core::gateway::LookupError;
    use insucalc_gateway::{BackendFixture, Endpoint, FailureKind, FixtureGateway};

    #[tokio::test]
    async fn codes_are_deduplicated_in_order() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_related("21686", &["31002", "31001", "31002", "21686", " "]);
        let resolution = resolve_related(&gw, "21686").await;
        assert_eq!(resolution.codes, vec!["31002", "31001"]);
        assert!(resolution.error.is_none());
    }

    #[tokio::test]
    async fn missing_riders_resolve_to_empty() {
        let gw = FixtureGateway::new(BackendFixture::default());
        let resolution = resolve_related(&gw, "21686").await;
        assert!(resolution.codes.is_empty());
        assert!(resolution.error.is_none());
    }

    #[tokio::test]
    async fn failure_degrades_to_primary_only() {
        let gw = FixtureGateway::new(BackendFixture::default())
            .with_related("21686", &["31001"])
            .with_failure(Endpoint::RelatedCodes, Some("21686"), FailureKind::Network);
        let resolution = resolve_related(&gw, "21686").await;
        assert!(resolution.codes.is_empty());
        match resolution.error {
            Some(MatrixError::Resolution { code, source }) => {
                assert_eq!(code, "21686");
                assert!(matches!(source, LookupError::NetworkUnavailable { .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
