//! Row expansion: one row per term combination of a code.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use insucalc_core::error::MatrixError;
use insucalc_core::gateway::LookupGateway;
use insucalc_core::product::{PolicyTerms, ProductInfo};
use insucalc_core::row::{Row, RowKind};

/// Rows for the related codes plus the detail lookups that failed.
#[derive(Debug, Default)]
pub struct Expansion {
    pub rows: Vec<Row>,
    pub gaps: Vec<MatrixError>,
}

/// Expand one resolved product into rows.
///
/// Duplicate term triples collapse to one row. An empty or missing term
/// list yields a single row with placeholder terms.
#[must_use]
pub fn expand(code: &str, product: &ProductInfo, kind: RowKind) -> Vec<Row> {
    let mut terms = product.term_list();
    if terms.is_empty() {
        terms.push(PolicyTerms::default());
    }

    let mut seen = HashSet::new();
    terms
        .iter()
        .map(|t| Row::from_terms(code, product, t, kind))
        .filter(|row| seen.insert(row.key().clone()))
        .collect()
}

/// Fetch and expand every related code concurrently, keeping code order.
///
/// A code whose detail lookup fails contributes one placeholder row and one gap.
pub async fn expand_related(gateway: &dyn LookupGateway, codes: &[String]) -> Expansion {
    let details = join_all(codes.iter().map(|code| gateway.product(code))).await;

    let mut expansion = Expansion::default();
    for (code, detail) in codes.iter().zip(details) {
        match detail {
            Ok(product) => expansion.rows.extend(expand(code, &product, RowKind::Related)),
            Err(source) => {
                warn!(code = %code, error = %source, "Related code detail lookup failed");
                expansion.rows.push(Row::detail_unavailable(code, RowKind::Related));
                expansion.gaps.push(MatrixError::ExpansionGap {
                    code: code.clone(),
                    source,
                });
            }
        }
    }
    debug!(codes = codes.len(), rows = expansion.rows.len(), "Related codes expanded");
    expansion
}

/// Concatenate primary and related rows, dropping any repeated key.
#[must_use]
pub fn assemble(primary: Vec<Row>, related: Vec<Row>) -> Vec<Row> {
    let mut seen = HashSet::new();
    primary
        .into_iter()
        .chain(related)
        .filter(|row| seen.insert(row.key().clone()))
        .collect()
}
