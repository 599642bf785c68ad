//! Orchestration error taxonomy.

use crate::gateway::LookupError;
use crate::row::RowKey;

/// Failures raised while building or refreshing a matrix.
///
/// Only `PrimaryUnavailable`, `InvalidInput`, `Superseded` and `Cancelled`
/// are returned to callers. The other variants are recovered locally and
/// recorded in the selection error list through their `Display` text.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MatrixError {
    /// Related-code discovery failed; the matrix degrades to primary-only.
    #[error("관련 코드 조회 실패 ({code}): {source}")]
    Resolution { code: String, source: LookupError },

    /// A related code's own detail lookup failed; a placeholder row stands in.
    #[error("특약 코드 {code} 조회 실패: {source}")]
    ExpansionGap { code: String, source: LookupError },

    /// One row's enrichment reported problems.
    #[error("{key}: {message}")]
    Enrichment { key: RowKey, message: String },

    /// The primary code's own detail could not be fetched; no rows exist.
    #[error("주계약 {code} 선택 실패: {source}")]
    PrimaryUnavailable { code: String, source: LookupError },

    /// A newer selection replaced this operation.
    #[error("operation superseded by a newer selection")]
    Superseded,

    /// The user interrupted the run.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller passed an unusable value.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_message_names_code_and_cause() {
        let err = MatrixError::Resolution {
            code: "21686".into(),
            source: LookupError::Status {
                status: 500,
                body: "oops".into(),
            },
        };
        let text = err.to_string();
        assert!(text.contains("21686"));
        assert!(text.contains("HTTP 500"));
    }

    #[test]
    fn enrichment_message_names_row() {
        let err = MatrixError::Enrichment {
            key: RowKey::new("31002", "10년", "10년납"),
            message: "서버 내부 오류".into(),
        };
        assert_eq!(err.to_string(), "31002(10년, 10년납): 서버 내부 오류");
    }
}
