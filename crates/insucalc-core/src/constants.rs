//! Constants for matrix defaults, progress checkpoints, and display text.

/// Default backend base URL.
pub const DEFAULT_API_BASE: &str = "http://localhost:8082";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default insured age.
pub const DEFAULT_AGE: u32 = 15;

/// Minimum insured age accepted by the backend.
pub const MIN_AGE: u32 = 15;

/// Default base amount (in units of 10,000 won).
pub const DEFAULT_BASE_AMOUNT: u64 = 100;

/// Progress once the primary product detail is known.
pub const PROGRESS_PRIMARY_LOADED: u8 = 10;

/// Progress once related-code resolution has completed.
pub const PROGRESS_RELATED_RESOLVED: u8 = 20;

/// Progress once the matrix has been expanded and published.
pub const PROGRESS_ROWS_PUBLISHED: u8 = 30;

/// Width of the enrichment band (30% to 90%).
pub const PROGRESS_ENRICH_BAND: u8 = 60;

/// Terminal progress value.
pub const PROGRESS_DONE: u8 = 100;

/// A row whose enrichment takes longer than this is logged as slow.
pub const SLOW_ROW_MS: u128 = 3_000;

/// A selection taking longer than this is logged as slow.
pub const SLOW_OPERATION_MS: u128 = 10_000;

/// Placeholder for missing term values.
pub const PLACEHOLDER: &str = "—";

/// Marker for a product whose name could not be resolved.
pub const NAME_UNAVAILABLE: &str = "상품명 없음";

/// Row diagnostic: the backend could not be reached.
pub const DIAG_CONNECTION_FAILED: &str = "백엔드 서버 연결 실패";

/// Row diagnostic: the backend answered with a server error.
pub const DIAG_SERVER_ERROR: &str = "서버 내부 오류";

/// Row diagnostic prefix for any other lookup failure.
pub const DIAG_LOOKUP_FAILED: &str = "데이터 조회 실패";

/// Row note for a related code whose own detail lookup failed.
pub const DIAG_DETAIL_UNAVAILABLE: &str = "상품 정보 조회 실패";

/// Exit codes for the command-line binary.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// A backend request timed out.
    pub const ERROR_TIMEOUT: i32 = 2;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// The backend could not be reached.
    pub const ERROR_UNAVAILABLE: i32 = 5;
    /// Cancelled by user (Ctrl+C).
    pub const ERROR_CANCELED: i32 = 130;
}
