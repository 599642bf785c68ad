//! In-memory gateway loaded from a JSON backend fixture.
//!
//! Used for offline runs (`--fixture`) and deterministic tests. Failures
//! can be injected per endpoint and code, and every call is counted.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use insucalc_core::gateway::{LookupError, LookupGateway, TermQuery};
use insucalc_core::product::{
    CodeEntry, ContractNotes, DataCheck, DocumentEntry, LimitInfo, MinMaxPremium, PolicyTerms,
    PremiumQuote, ProductInfo, RelatedCode, TermsPayload,
};

/// Base amount fixture premiums are recorded at.
const FIXTURE_BASE_AMOUNT: f64 = 100.0;

/// Errors that can occur when loading a fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    /// The fixture file could not be read.
    #[error("cannot read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The fixture file is not valid JSON of the expected shape.
    #[error("invalid fixture {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Backend endpoint a failure can be injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Endpoint {
    Product,
    RelatedCodes,
    Check,
    Premium,
    Documents,
    MainCodes,
    Limit,
    MinMax,
    ContractNotes,
}

/// Kind of injected failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FailureKind {
    /// Backend unreachable.
    Network,
    /// Request timed out.
    Timeout,
    /// Backend answered with a status code.
    Status {
        status: u16,
        #[serde(default)]
        body: String,
    },
}

/// A failure returned for every matching call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedFailure {
    pub endpoint: Endpoint,
    /// Code (or document name) the failure applies to; `None` matches all.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(flatten)]
    pub kind: FailureKind,
}

/// Serialized backend state.
///
/// Availability checks and premiums are looked up by `"code|insuTerm|payTerm"`
/// first and then by bare code. Premiums are recorded at a base amount of
/// 100 and scaled linearly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackendFixture {
    pub documents: Vec<DocumentEntry>,
    pub main_codes: HashMap<String, Vec<CodeEntry>>,
    pub products: HashMap<String, ProductInfo>,
    pub related_codes: HashMap<String, Vec<RelatedCode>>,
    pub checks: HashMap<String, DataCheck>,
    pub premiums: HashMap<String, PremiumQuote>,
    pub limits: HashMap<String, LimitInfo>,
    pub min_max: HashMap<String, MinMaxPremium>,
    pub contract_notes: HashMap<String, ContractNotes>,
    pub failures: Vec<InjectedFailure>,
}

/// Gateway answering from a [`BackendFixture`].
pub struct FixtureGateway {
    fixture: BackendFixture,
    calls: Mutex<HashMap<Endpoint, usize>>,
}

impl FixtureGateway {
    #[must_use]
    pub fn new(fixture: BackendFixture) -> Self {
        Self {
            fixture,
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// Load a fixture from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, FixtureError> {
        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: shown.clone(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| FixtureError::Parse { path: shown, source })
    }

    /// Parse a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Add a product with the given name and terms.
    #[must_use]
    pub fn with_product(mut self, code: &str, name: &str, terms: Vec<PolicyTerms>) -> Self {
        self.fixture.products.insert(
            code.to_string(),
            ProductInfo {
                insu_cd: code.to_string(),
                name: Some(name.to_string()),
                terms: Some(TermsPayload::Many(terms)),
                ..ProductInfo::default()
            },
        );
        self
    }

    /// Attach riders to a primary code.
    #[must_use]
    pub fn with_related(mut self, primary: &str, codes: &[&str]) -> Self {
        self.fixture.related_codes.insert(
            primary.to_string(),
            codes
                .iter()
                .map(|c| RelatedCode {
                    insu_cd: (*c).to_string(),
                    name: None,
                })
                .collect(),
        );
        self
    }

    /// Record an availability check, keyed by code or `code|insu|pay`.
    #[must_use]
    pub fn with_check(mut self, key: &str, check: DataCheck) -> Self {
        self.fixture.checks.insert(key.to_string(), check);
        self
    }

    /// Record premiums at the fixture base amount, keyed by code or `code|insu|pay`.
    #[must_use]
    pub fn with_premium(mut self, key: &str, male: Option<f64>, female: Option<f64>) -> Self {
        self.fixture.premiums.insert(
            key.to_string(),
            PremiumQuote {
                man_premium: male,
                fml_premium: female,
                errors: Vec::new(),
            },
        );
        self
    }

    /// Inject a failure for an endpoint, optionally limited to one code.
    #[must_use]
    pub fn with_failure(mut self, endpoint: Endpoint, code: Option<&str>, kind: FailureKind) -> Self {
        self.fixture.failures.push(InjectedFailure {
            endpoint,
            code: code.map(str::to_string),
            kind,
        });
        self
    }

    /// Number of calls made to an endpoint.
    #[must_use]
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls.lock().get(&endpoint).copied().unwrap_or(0)
    }

    fn enter(&self, endpoint: Endpoint, code: &str) -> Result<(), LookupError> {
        *self.calls.lock().entry(endpoint).or_insert(0) += 1;
        debug!(?endpoint, code, "Fixture lookup");

        let failure = self.fixture.failures.iter().find(|f| {
            f.endpoint == endpoint && f.code.as_deref().map_or(true, |c| c == code)
        });
        match failure.map(|f| &f.kind) {
            None => Ok(()),
            Some(FailureKind::Network) => Err(LookupError::NetworkUnavailable {
                url: format!("fixture://{endpoint:?}/{code}"),
                reason: "connection refused".to_string(),
            }),
            Some(FailureKind::Timeout) => Err(LookupError::Timeout {
                url: format!("fixture://{endpoint:?}/{code}"),
                timeout: Duration::from_secs(0),
            }),
            Some(FailureKind::Status { status, body }) => Err(LookupError::Status {
                status: *status,
                body: body.clone(),
            }),
        }
    }

    fn by_terms<'a, T>(map: &'a HashMap<String, T>, code: &str, query: &TermQuery) -> Option<&'a T> {
        map.get(&format!("{code}|{}|{}", query.insu_term, query.pay_term))
            .or_else(|| map.get(code))
    }
}

fn not_found(what: &str, code: &str) -> LookupError {
    LookupError::Status {
        status: 404,
        body: format!("{what} not found: {code}"),
    }
}

#[allow(clippy::cast_precision_loss)]
fn scale(value: Option<f64>, base_amount: u64) -> Option<f64> {
    value.map(|v| v * base_amount as f64 / FIXTURE_BASE_AMOUNT)
}

#[async_trait]
impl LookupGateway for FixtureGateway {
    async fn product(&self, code: &str) -> Result<ProductInfo, LookupError> {
        self.enter(Endpoint::Product, code)?;
        self.fixture
            .products
            .get(code)
            .cloned()
            .ok_or_else(|| not_found("product", code))
    }

    async fn related_codes(&self, code: &str) -> Result<Vec<RelatedCode>, LookupError> {
        self.enter(Endpoint::RelatedCodes, code)?;
        Ok(self.fixture.related_codes.get(code).cloned().unwrap_or_default())
    }

    async fn check_data(&self, code: &str, query: &TermQuery) -> Result<DataCheck, LookupError> {
        self.enter(Endpoint::Check, code)?;
        Ok(Self::by_terms(&self.fixture.checks, code, query)
            .cloned()
            .unwrap_or_default())
    }

    async fn premium_by_terms(
        &self,
        code: &str,
        query: &TermQuery,
        base_amount: u64,
    ) -> Result<PremiumQuote, LookupError> {
        self.enter(Endpoint::Premium, code)?;
        let Some(quote) = Self::by_terms(&self.fixture.premiums, code, query) else {
            return Ok(PremiumQuote::default());
        };
        Ok(PremiumQuote {
            man_premium: scale(quote.man_premium, base_amount),
            fml_premium: scale(quote.fml_premium, base_amount),
            errors: quote.errors.clone(),
        })
    }

    async fn documents(&self) -> Result<Vec<DocumentEntry>, LookupError> {
        self.enter(Endpoint::Documents, "")?;
        Ok(self.fixture.documents.clone())
    }

    async fn main_codes(&self, document: &str) -> Result<Vec<CodeEntry>, LookupError> {
        self.enter(Endpoint::MainCodes, document)?;
        Ok(self.fixture.main_codes.get(document).cloned().unwrap_or_default())
    }

    async fn limit(&self, code: &str, _age: u32) -> Result<LimitInfo, LookupError> {
        self.enter(Endpoint::Limit, code)?;
        self.fixture
            .limits
            .get(code)
            .cloned()
            .ok_or_else(|| not_found("limit", code))
    }

    async fn min_max_premium(&self, code: &str, _age: u32) -> Result<MinMaxPremium, LookupError> {
        self.enter(Endpoint::MinMax, code)?;
        self.fixture
            .min_max
            .get(code)
            .cloned()
            .ok_or_else(|| not_found("premium range", code))
    }

    async fn contract_notes(&self, code: &str) -> Result<ContractNotes, LookupError> {
        self.enter(Endpoint::ContractNotes, code)?;
        Ok(self.fixture.contract_notes.get(code).cloned().unwrap_or_default())
    }
}
