//! Backend payload types.
//!
//! Every optional field the backend may omit or send as `null` is an
//! `Option` here, and the placeholder policy is applied once through the
//! accessor methods rather than at each use site.

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{NAME_UNAVAILABLE, PLACEHOLDER};

/// One term definition of a product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyTerms {
    /// Insurance period, e.g. `"10년"` or `"종신"`.
    #[serde(default)]
    pub insu_term: Option<String>,
    /// Payment period, e.g. `"10년납"`.
    #[serde(default)]
    pub pay_term: Option<String>,
    /// Admissible age range, e.g. `"15~80"`.
    #[serde(default)]
    pub age_range: Option<String>,
    /// Renewal description.
    #[serde(default)]
    pub renew: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub special_notes: Option<String>,
}

impl PolicyTerms {
    /// Create a term definition from its three keyed values.
    #[must_use]
    pub fn new(insu_term: &str, pay_term: &str, age_range: &str) -> Self {
        Self {
            insu_term: Some(insu_term.to_string()),
            pay_term: Some(pay_term.to_string()),
            age_range: Some(age_range.to_string()),
            ..Self::default()
        }
    }

    /// Insurance period, or the placeholder when absent or blank.
    #[must_use]
    pub fn insu_term_or_placeholder(&self) -> String {
        or_placeholder(self.insu_term.as_deref())
    }

    /// Payment period, or the placeholder when absent or blank.
    #[must_use]
    pub fn pay_term_or_placeholder(&self) -> String {
        or_placeholder(self.pay_term.as_deref())
    }

    /// Age range, or the placeholder when absent or blank.
    #[must_use]
    pub fn age_range_or_placeholder(&self) -> String {
        or_placeholder(self.age_range.as_deref())
    }
}

/// Term definitions as sent by the backend: a list, or a legacy single object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TermsPayload {
    /// One entry per term combination.
    Many(Vec<PolicyTerms>),
    /// Legacy unkeyed single definition.
    Single(PolicyTerms),
}

/// Product detail (`GET /api/product/{code}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInfo {
    /// Product code.
    #[serde(default)]
    pub insu_cd: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Classification as reported by the backend (`주계약` / `특약`).
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    /// Term definitions.
    #[serde(default)]
    pub terms: Option<TermsPayload>,
    /// Whether premium data exists for this product.
    #[serde(default)]
    pub calc_available: Option<bool>,
    /// Optional backend message.
    #[serde(default)]
    pub message: Option<String>,
}

impl ProductInfo {
    /// Display name, or the "name unavailable" marker.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => NAME_UNAVAILABLE.to_string(),
        }
    }

    /// Term definitions as a list; a legacy single object becomes one entry.
    /// An empty or missing list yields an empty vector.
    #[must_use]
    pub fn term_list(&self) -> Vec<PolicyTerms> {
        match &self.terms {
            Some(TermsPayload::Many(list)) => list.clone(),
            Some(TermsPayload::Single(terms)) => vec![terms.clone()],
            None => Vec::new(),
        }
    }
}

/// One entry of the related-codes listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCode {
    /// Rider code.
    pub insu_cd: String,
    /// Rider name, when the backend includes it.
    #[serde(default)]
    pub name: Option<String>,
}

/// Related-codes response (`GET /api/product/{code}/related-codes`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedCodesResponse {
    /// Riders attached to the primary code.
    #[serde(default)]
    pub related_codes: Vec<RelatedCode>,
}

/// Data availability check (`GET /api/data/check/{code}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataCheck {
    /// Reserve key table present.
    #[serde(default, deserialize_with = "yes_no")]
    pub rsv_key: bool,
    /// Reserve rate table present.
    #[serde(default, deserialize_with = "yes_no")]
    pub rsv_rate: bool,
    /// Premium rate table present.
    #[serde(default, deserialize_with = "yes_no")]
    pub prem_rate: bool,
    /// Validation messages.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Premium quote (`GET /api/premium/calculate-by-terms/{code}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumQuote {
    /// Male premium in won.
    #[serde(default)]
    pub man_premium: Option<f64>,
    /// Female premium in won.
    #[serde(default)]
    pub fml_premium: Option<f64>,
    /// Calculation messages.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// A source document (`GET /api/pdf/list`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    /// File name.
    pub name: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    /// Modification time as reported by the backend.
    #[serde(default)]
    pub mtime: Option<String>,
}

/// A product code listed in a document (`GET /api/pdf/codes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeEntry {
    /// Product code.
    pub insu_cd: String,
    /// Product name.
    #[serde(default)]
    pub name: String,
    /// Classification.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Subscription limit (`GET /api/limit/{code}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitInfo {
    /// Minimum insured amount in won.
    #[serde(default)]
    pub min_won: Option<f64>,
    /// Maximum insured amount in won.
    #[serde(default)]
    pub max_won: Option<f64>,
    /// Human-readable range.
    #[serde(default)]
    pub display: Option<String>,
    /// Backend message.
    #[serde(default)]
    pub message: Option<String>,
}

/// Minimum and maximum premiums per sex (`GET /api/premium/minmax/{code}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinMaxPremium {
    #[serde(default)]
    pub man_min: Option<f64>,
    #[serde(default)]
    pub man_max: Option<f64>,
    #[serde(default)]
    pub fml_min: Option<f64>,
    #[serde(default)]
    pub fml_max: Option<f64>,
    /// Calculation messages.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Contract condition notes (`GET /api/contract/terms/{code}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractNotes {
    #[serde(default)]
    pub notes: Vec<String>,
}

fn or_placeholder(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Accepts `"Y"`/`"N"` strings, booleans, or `null`.
fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Text(s)) => s.trim().eq_ignore_ascii_case("Y"),
        None => false,
    })
}
