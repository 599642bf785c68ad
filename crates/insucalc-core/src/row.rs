//! The matrix row model.
//!
//! A `Row` is identified by its `RowKey` for its whole life. Only the
//! derived fields (availability, premiums, error text) change, and only
//! through `apply_check` / `apply_premium`.

use std::fmt;

use serde::Serialize;

use crate::constants::{DIAG_DETAIL_UNAVAILABLE, NAME_UNAVAILABLE, PLACEHOLDER};
use crate::product::{PolicyTerms, ProductInfo};

/// Natural key of a row: `(code, insurance term, payment term)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowKey {
    pub insu_cd: String,
    pub insu_term: String,
    pub pay_term: String,
}

impl RowKey {
    #[must_use]
    pub fn new(insu_cd: &str, insu_term: &str, pay_term: &str) -> Self {
        Self {
            insu_cd: insu_cd.to_string(),
            insu_term: insu_term.to_string(),
            pay_term: pay_term.to_string(),
        }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.insu_cd, self.insu_term, self.pay_term)
    }
}

/// Whether a row belongs to the selected main contract or to a rider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowKind {
    Primary,
    Related,
}

impl RowKind {
    /// Korean display label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "주계약",
            Self::Related => "특약",
        }
    }
}

/// Presence of the three backing tables for one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Availability {
    /// Reserve key table.
    pub reserve_key: bool,
    /// Reserve rate table.
    pub reserve_rate: bool,
    /// Premium rate table.
    pub premium_rate: bool,
}

impl Availability {
    /// All three facets absent.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let yn = |b: bool| if b { 'Y' } else { 'N' };
        write!(
            f,
            "준비금키 {}/준비금 {}/보험료 {}",
            yn(self.reserve_key),
            yn(self.reserve_rate),
            yn(self.premium_rate)
        )
    }
}

/// Settled result of the availability check for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The check answered; carries any validation messages.
    Checked {
        availability: Availability,
        messages: Vec<String>,
    },
    /// The check failed; availability keeps its prior state.
    Failed { diagnostic: String },
}

/// Settled result of the premium calculation for one row.
#[derive(Debug, Clone, PartialEq)]
pub enum PremiumOutcome {
    /// The calculation answered; carries any calculation messages.
    Quoted {
        male: Option<f64>,
        female: Option<f64>,
        messages: Vec<String>,
    },
    /// The calculation failed; premiums are cleared.
    Failed { diagnostic: String },
}

/// One matrix entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(flatten)]
    key: RowKey,
    name: String,
    age_range: String,
    kind: RowKind,
    availability: Availability,
    male_premium: Option<f64>,
    female_premium: Option<f64>,
    error: Option<String>,
    #[serde(skip)]
    detail_unavailable: bool,
    #[serde(skip)]
    check_messages: Vec<String>,
    #[serde(skip)]
    premium_messages: Vec<String>,
}

impl Row {
    /// Create a row for one term definition of a resolved product.
    #[must_use]
    pub fn from_terms(code: &str, product: &ProductInfo, terms: &PolicyTerms, kind: RowKind) -> Self {
        let key = RowKey::new(
            code,
            &terms.insu_term_or_placeholder(),
            &terms.pay_term_or_placeholder(),
        );
        Self::new(key, product.display_name(), terms.age_range_or_placeholder(), kind)
    }

    /// Create the placeholder row for a code whose detail could not be fetched.
    #[must_use]
    pub fn detail_unavailable(code: &str, kind: RowKind) -> Self {
        let mut row = Self::new(
            RowKey::new(code, PLACEHOLDER, PLACEHOLDER),
            NAME_UNAVAILABLE.to_string(),
            PLACEHOLDER.to_string(),
            kind,
        );
        row.detail_unavailable = true;
        row.refresh_error();
        row
    }

    fn new(key: RowKey, name: String, age_range: String, kind: RowKind) -> Self {
        Self {
            key,
            name,
            age_range,
            kind,
            availability: Availability::absent(),
            male_premium: None,
            female_premium: None,
            error: None,
            detail_unavailable: false,
            check_messages: Vec::new(),
            premium_messages: Vec::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> &RowKey {
        &self.key
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn age_range(&self) -> &str {
        &self.age_range
    }

    #[must_use]
    pub fn kind(&self) -> RowKind {
        self.kind
    }

    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability
    }

    #[must_use]
    pub fn male_premium(&self) -> Option<f64> {
        self.male_premium
    }

    #[must_use]
    pub fn female_premium(&self) -> Option<f64> {
        self.female_premium
    }

    /// Comma-joined row-local messages, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this row stands in for a code whose detail lookup failed.
    #[must_use]
    pub fn is_detail_unavailable(&self) -> bool {
        self.detail_unavailable
    }

    /// Merge an availability check result.
    pub fn apply_check(&mut self, outcome: &CheckOutcome) {
        match outcome {
            CheckOutcome::Checked {
                availability,
                messages,
            } => {
                self.availability = *availability;
                self.check_messages.clone_from(messages);
            }
            CheckOutcome::Failed { diagnostic } => {
                self.check_messages = vec![diagnostic.clone()];
            }
        }
        self.refresh_error();
    }

    /// Merge a premium calculation result.
    pub fn apply_premium(&mut self, outcome: &PremiumOutcome) {
        match outcome {
            PremiumOutcome::Quoted {
                male,
                female,
                messages,
            } => {
                self.male_premium = *male;
                self.female_premium = *female;
                self.premium_messages.clone_from(messages);
            }
            PremiumOutcome::Failed { diagnostic } => {
                self.male_premium = None;
                self.female_premium = None;
                self.premium_messages = vec![diagnostic.clone()];
            }
        }
        self.refresh_error();
    }

    fn refresh_error(&mut self) {
        let mut parts: Vec<&str> = Vec::new();
        if self.detail_unavailable {
            parts.push(DIAG_DETAIL_UNAVAILABLE);
        }
        parts.extend(self.check_messages.iter().map(String::as_str));
        parts.extend(self.premium_messages.iter().map(String::as_str));
        self.error = if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        let product = ProductInfo {
            insu_cd: "21686".into(),
            name: Some("암보험".into()),
            ..ProductInfo::default()
        };
        Row::from_terms(
            "21686",
            &product,
            &PolicyTerms::new("10년", "10년납", "15~80"),
            RowKind::Primary,
        )
    }

    #[test]
    fn new_row_has_placeholder_state() {
        let row = sample_row();
        assert_eq!(row.key(), &RowKey::new("21686", "10년", "10년납"));
        assert_eq!(row.availability(), Availability::absent());
        assert_eq!(row.male_premium(), None);
        assert_eq!(row.error(), None);
    }

    #[test]
    fn availability_display() {
        assert_eq!(
            Availability::absent().to_string(),
            "준비금키 N/준비금 N/보험료 N"
        );
        let a = Availability {
            reserve_key: true,
            reserve_rate: false,
            premium_rate: true,
        };
        assert_eq!(a.to_string(), "준비금키 Y/준비금 N/보험료 Y");
    }

    #[test]
    fn failed_check_keeps_prior_availability() {
        let mut row = sample_row();
        let present = Availability {
            reserve_key: true,
            reserve_rate: true,
            premium_rate: true,
        };
        row.apply_check(&CheckOutcome::Checked {
            availability: present,
            messages: vec![],
        });
        row.apply_check(&CheckOutcome::Failed {
            diagnostic: "서버 내부 오류".into(),
        });
        assert_eq!(row.availability(), present);
        assert_eq!(row.error(), Some("서버 내부 오류"));
    }

    #[test]
    fn messages_are_comma_joined() {
        let mut row = sample_row();
        row.apply_check(&CheckOutcome::Checked {
            availability: Availability::absent(),
            messages: vec!["a".into(), "b".into()],
        });
        row.apply_premium(&PremiumOutcome::Quoted {
            male: Some(1.0),
            female: None,
            messages: vec!["c".into()],
        });
        assert_eq!(row.error(), Some("a, b, c"));
    }

    #[test]
    fn premium_refresh_preserves_check_messages() {
        let mut row = sample_row();
        row.apply_check(&CheckOutcome::Checked {
            availability: Availability::absent(),
            messages: vec!["rate missing".into()],
        });
        row.apply_premium(&PremiumOutcome::Failed {
            diagnostic: "백엔드 서버 연결 실패".into(),
        });
        row.apply_premium(&PremiumOutcome::Quoted {
            male: Some(100.0),
            female: Some(90.0),
            messages: vec![],
        });
        assert_eq!(row.error(), Some("rate missing"));
        assert_eq!(row.male_premium(), Some(100.0));
    }

    #[test]
    fn failed_premium_clears_values() {
        let mut row = sample_row();
        row.apply_premium(&PremiumOutcome::Quoted {
            male: Some(100.0),
            female: Some(90.0),
            messages: vec![],
        });
        row.apply_premium(&PremiumOutcome::Failed {
            diagnostic: "x".into(),
        });
        assert_eq!(row.male_premium(), None);
        assert_eq!(row.female_premium(), None);
    }

    #[test]
    fn detail_unavailable_row_keeps_its_note() {
        let mut row = Row::detail_unavailable("31001", RowKind::Related);
        assert_eq!(row.name(), NAME_UNAVAILABLE);
        assert_eq!(row.key().insu_term, PLACEHOLDER);
        assert_eq!(row.error(), Some(DIAG_DETAIL_UNAVAILABLE));

        row.apply_check(&CheckOutcome::Checked {
            availability: Availability::absent(),
            messages: vec![],
        });
        assert_eq!(row.error(), Some(DIAG_DETAIL_UNAVAILABLE));
    }

    #[test]
    fn row_serializes_flat_key() {
        let json = serde_json::to_value(sample_row()).unwrap();
        assert_eq!(json["insuCd"], "21686");
        assert_eq!(json["kind"], "primary");
        assert!(json.get("checkMessages").is_none());
    }
}
