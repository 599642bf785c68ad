//! HTTP implementation of the lookup gateway.
//!
//! Every call is a bounded-timeout JSON GET. Failures are classified into
//! `LookupError` kinds so callers can tell a dead backend from a 5xx.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use insucalc_core::gateway::{LookupError, LookupGateway, TermQuery};
use insucalc_core::options::GatewayOptions;
use insucalc_core::product::{
    CodeEntry, ContractNotes, DataCheck, DocumentEntry, LimitInfo, MinMaxPremium, PremiumQuote,
    ProductInfo, RelatedCode, RelatedCodesResponse,
};

/// Calls slower than this are logged.
const SLOW_CALL: Duration = Duration::from_secs(1);

/// Gateway backed by the product backend's REST API.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    base: Url,
    timeout: Duration,
}

impl HttpGateway {
    /// Create a gateway from normalized options.
    pub fn new(opts: GatewayOptions) -> Result<Self, LookupError> {
        let opts = opts.normalize();
        let base = Url::parse(&opts.api_base)
            .map_err(|e| LookupError::Decode(format!("invalid base URL {}: {e}", opts.api_base)))?;
        let client = Client::builder()
            .timeout(opts.timeout)
            .build()
            .map_err(|e| LookupError::NetworkUnavailable {
                url: opts.api_base.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base,
            timeout: opts.timeout,
        })
    }

    /// Base URL requests are issued against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, LookupError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| LookupError::Decode(format!("base URL cannot hold a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, LookupError> {
        let mut url = self.endpoint(segments)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        let shown = url.to_string();
        let start = Instant::now();
        debug!(url = %shown, timeout = ?self.timeout, "GET");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json; charset=utf-8")
            .send()
            .await
            .map_err(|e| self.classify(&shown, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify(&shown, &e))?;
        let elapsed = start.elapsed();
        debug!(url = %shown, status = status.as_u16(), elapsed_ms = elapsed.as_millis(), "Response");

        if elapsed > SLOW_CALL {
            warn!(url = %shown, elapsed_ms = elapsed.as_millis(), "Slow backend call");
        }

        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| LookupError::Decode(format!("{shown}: {e}")))
    }

    fn classify(&self, url: &str, err: &reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else if err.is_decode() {
            LookupError::Decode(err.to_string())
        } else {
            LookupError::NetworkUnavailable {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

fn term_params(query: &TermQuery) -> Vec<(&'static str, String)> {
    vec![
        ("age", query.age.to_string()),
        ("insuTerm", query.insu_term.clone()),
        ("payTerm", query.pay_term.clone()),
    ]
}

#[async_trait]
impl LookupGateway for HttpGateway {
    async fn product(&self, code: &str) -> Result<ProductInfo, LookupError> {
        self.get_json(&["api", "product", code], &[]).await
    }

    async fn related_codes(&self, code: &str) -> Result<Vec<RelatedCode>, LookupError> {
        let resp: RelatedCodesResponse = self
            .get_json(&["api", "product", code, "related-codes"], &[])
            .await?;
        Ok(resp.related_codes)
    }

    async fn check_data(&self, code: &str, query: &TermQuery) -> Result<DataCheck, LookupError> {
        self.get_json(&["api", "data", "check", code], &term_params(query))
            .await
    }

    async fn premium_by_terms(
        &self,
        code: &str,
        query: &TermQuery,
        base_amount: u64,
    ) -> Result<PremiumQuote, LookupError> {
        let mut params = term_params(query);
        params.push(("baseAmount", base_amount.to_string()));
        self.get_json(&["api", "premium", "calculate-by-terms", code], &params)
            .await
    }

    async fn documents(&self) -> Result<Vec<DocumentEntry>, LookupError> {
        self.get_json(&["api", "pdf", "list"], &[]).await
    }

    async fn main_codes(&self, document: &str) -> Result<Vec<CodeEntry>, LookupError> {
        self.get_json(
            &["api", "pdf", "codes"],
            &[("file", document.to_string()), ("type", "main".to_string())],
        )
        .await
    }

    async fn limit(&self, code: &str, age: u32) -> Result<LimitInfo, LookupError> {
        self.get_json(&["api", "limit", code], &[("age", age.to_string())])
            .await
    }

    async fn min_max_premium(&self, code: &str, age: u32) -> Result<MinMaxPremium, LookupError> {
        self.get_json(&["api", "premium", "minmax", code], &[("age", age.to_string())])
            .await
    }

    async fn contract_notes(&self, code: &str) -> Result<ContractNotes, LookupError> {
        self.get_json(&["api", "contract", "terms", code], &[]).await
    }
}
