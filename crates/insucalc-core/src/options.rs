//! Gateway and selection options.

use std::time::Duration;

use crate::constants::{
    DEFAULT_AGE, DEFAULT_API_BASE, DEFAULT_BASE_AMOUNT, DEFAULT_TIMEOUT_SECS, MIN_AGE,
};

/// Transport options for a lookup gateway.
#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Backend base URL, without trailing slash.
    pub api_base: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GatewayOptions {
    /// Normalize options, applying defaults where values are empty or zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        let trimmed = self.api_base.trim().trim_end_matches('/');
        self.api_base = if trimmed.is_empty() {
            DEFAULT_API_BASE.to_string()
        } else {
            trimmed.to_string()
        };
        if self.timeout.is_zero() {
            self.timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        }
        self
    }
}

/// Age and base amount a new selection starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionDefaults {
    /// Insured age.
    pub age: u32,
    /// Base amount (in units of 10,000 won).
    pub base_amount: u64,
}

impl Default for SelectionDefaults {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            base_amount: DEFAULT_BASE_AMOUNT,
        }
    }
}

impl SelectionDefaults {
    /// Normalize defaults: ages below the minimum are raised, a zero amount
    /// falls back to the default.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        self.age = self.age.max(MIN_AGE);
        if self.base_amount == 0 {
            self.base_amount = DEFAULT_BASE_AMOUNT;
        }
        self
    }
}
