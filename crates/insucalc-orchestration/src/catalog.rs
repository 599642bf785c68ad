//! Document catalog and single-code inspection.

use serde::Serialize;
use tracing::{debug, warn};

use insucalc_core::gateway::{LookupError, LookupGateway};
use insucalc_core::product::{CodeEntry, DocumentEntry, LimitInfo, MinMaxPremium, ProductInfo};

use crate::enricher::diagnose;
use crate::orchestrator::SelectionOrchestrator;

/// Main-contract codes found in one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeListing {
    pub document: String,
    pub codes: Vec<CodeEntry>,
    /// Set when the document yielded no codes.
    pub advisory: Option<String>,
}

/// Everything known about one code without building a matrix.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeInspection {
    pub code: String,
    pub age: u32,
    pub product: Option<ProductInfo>,
    pub limit: Option<LimitInfo>,
    pub premium_range: Option<MinMaxPremium>,
    pub notes: Vec<String>,
    /// One entry per failed part, plus backend messages.
    pub messages: Vec<String>,
}

pub async fn list_documents(gateway: &dyn LookupGateway) -> Result<Vec<DocumentEntry>, LookupError> {
    let documents = gateway.documents().await?;
    debug!(count = documents.len(), "Documents listed");
    Ok(documents)
}

pub async fn list_main_codes(
    gateway: &dyn LookupGateway,
    document: &str,
) -> Result<CodeListing, LookupError> {
    let codes = gateway.main_codes(document).await?;
    let advisory = codes.is_empty().then(|| {
        format!("주계약 코드 조회 실패: 파일 {document}에서 코드를 찾을 수 없습니다.")
    });
    Ok(CodeListing {
        document: document.to_string(),
        codes,
        advisory,
    })
}

fn settle<T>(code: &str, part: &str, result: Result<T, LookupError>, messages: &mut Vec<String>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(code, part, error = %err, "Inspection lookup failed");
            messages.push(format!("{part} 조회 실패 ({code}): {}", diagnose(&err)));
            None
        }
    }
}

/// Fetch product summary, limit, premium range and contract notes
/// concurrently. Each part fails on its own.
pub async fn inspect_code(gateway: &dyn LookupGateway, code: &str, age: u32) -> CodeInspection {
    let (product, limit, range, notes) = tokio::join!(
        gateway.product(code),
        gateway.limit(code, age),
        gateway.min_max_premium(code, age),
        gateway.contract_notes(code),
    );

    let mut messages = Vec::new();
    let product = settle(code, "상품 정보", product, &mut messages);
    let limit = settle(code, "가입한도", limit, &mut messages);
    let premium_range = settle(code, "MIN/MAX 보험료", range, &mut messages);
    let notes = settle(code, "계약 조건", notes, &mut messages)
        .map(|n| n.notes)
        .unwrap_or_default();

    if let Some(message) = product.as_ref().and_then(|p| p.message.clone()) {
        messages.push(message);
    }
    if let Some(message) = limit.as_ref().and_then(|l| l.message.clone()) {
        messages.push(message);
    }
    if let Some(range) = &premium_range {
        messages.extend(range.errors.iter().cloned());
    }

    CodeInspection {
        code: code.to_string(),
        age,
        product,
        limit,
        premium_range,
        notes,
        messages,
    }
}

impl SelectionOrchestrator {
    /// List a document's main codes; an empty listing is recorded in the
    /// selection error list.
    pub async fn document_codes(&self, document: &str) -> Result<CodeListing, LookupError> {
        let listing = list_main_codes(self.gateway(), document).await?;
        if let Some(advisory) = &listing.advisory {
            let token = self.store().current_token();
            if let Err(err) = self.store().push_error(&token, advisory.clone()) {
                debug!(error = %err, "Advisory dropped");
            }
        }
        Ok(listing)
    }

    /// Inspect one code at the current age.
    pub async fn inspect(&self, code: &str) -> CodeInspection {
        inspect_code(self.gateway(), code, self.store().age()).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use insucalc_core::options::SelectionDefaults;
    use insucalc_core::product::{ContractNotes, PolicyTerms};
    use insucalc_gateway::{BackendFixture, Endpoint, FailureKind, FixtureGateway};

    use super::*;

    fn fixture() -> BackendFixture {
        let mut fixture = BackendFixture::default();
        fixture.documents = vec![DocumentEntry {
            name: "암보험_사업방법서.pdf".into(),
            size: Some(1024),
            mtime: None,
        }];
        fixture.main_codes.insert(
            "암보험_사업방법서.pdf".into(),
            vec![CodeEntry {
                insu_cd: "21686".into(),
                name: "암보험".into(),
                kind: Some("주계약".into()),
            }],
        );
        fixture.limits.insert(
            "21686".into(),
            LimitInfo {
                min_won: Some(1_000_000.0),
                max_won: Some(50_000_000.0),
                display: Some("100만원 ~ 5000만원".into()),
                message: None,
            },
        );
        fixture.contract_notes.insert(
            "21686".into(),
            ContractNotes {
                notes: vec!["갱신형".into()],
            },
        );
        fixture
    }

    fn gateway() -> FixtureGateway {
        FixtureGateway::new(fixture())
            .with_product("21686", "암보험", vec![PolicyTerms::new("10년", "10년납", "15~80")])
    }

    #[tokio::test]
    async fn lists_documents_and_codes() {
        let gw = gateway();
        let docs = list_documents(&gw).await.unwrap();
        assert_eq!(docs.len(), 1);

        let listing = list_main_codes(&gw, "암보험_사업방법서.pdf").await.unwrap();
        assert_eq!(listing.codes[0].insu_cd, "21686");
        assert!(listing.advisory.is_none());
    }

    #[tokio::test]
    async fn empty_document_records_advisory() {
        let orch = SelectionOrchestrator::new(Arc::new(gateway()), SelectionDefaults::default());
        let listing = orch.document_codes("없는파일.pdf").await.unwrap();
        assert!(listing.codes.is_empty());
        let expected = "주계약 코드 조회 실패: 파일 없는파일.pdf에서 코드를 찾을 수 없습니다.";
        assert_eq!(listing.advisory.as_deref(), Some(expected));
        assert_eq!(orch.snapshot().errors, vec![expected.to_string()]);
    }

    #[tokio::test]
    async fn inspection_collects_every_part() {
        let report = inspect_code(&gateway(), "21686", 40).await;
        assert_eq!(report.age, 40);
        assert!(report.product.is_some());
        assert_eq!(report.limit.as_ref().unwrap().max_won, Some(50_000_000.0));
        assert_eq!(report.notes, vec!["갱신형"]);
        assert!(report.premium_range.is_none());
        assert_eq!(report.messages.len(), 1);
        assert!(report.messages[0].starts_with("MIN/MAX 보험료 조회 실패 (21686)"));
    }

    #[tokio::test]
    async fn inspection_parts_fail_independently() {
        let gw = gateway()
            .with_failure(Endpoint::Product, None, FailureKind::Network)
            .with_failure(Endpoint::Limit, None, FailureKind::Status {
                status: 500,
                body: String::new(),
            });
        let report = inspect_code(&gw, "21686", 15).await;
        assert!(report.product.is_none());
        assert!(report.limit.is_none());
        assert_eq!(report.notes, vec!["갱신형"]);
        assert!(report.messages.contains(&"상품 정보 조회 실패 (21686): 백엔드 서버 연결 실패".to_string()));
        assert!(report.messages.contains(&"가입한도 조회 실패 (21686): 서버 내부 오류".to_string()));
    }
}
