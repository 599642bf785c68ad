//! Application configuration from CLI flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;

use insucalc_core::constants::{DEFAULT_AGE, DEFAULT_API_BASE, DEFAULT_BASE_AMOUNT};
use insucalc_core::options::{GatewayOptions, SelectionDefaults};

/// Configuration errors detected after argument parsing.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid timeout {0:?} (expected e.g. \"30s\", \"500ms\", \"1m\")")]
    InvalidTimeout(String),

    #[error("invalid API base {url:?}: {reason}")]
    InvalidApiBase { url: String, reason: String },

    #[error("nothing to do: pass --code, --inspect, --document or --list-documents")]
    NoAction,
}

/// InsuCalc: insurance premium matrix for a main-contract code and its riders.
#[derive(Parser, Debug)]
#[command(name = "insucalc", version, about)]
#[allow(clippy::struct_excessive_bools)]
pub struct AppConfig {
    /// Main-contract code to build the premium matrix for.
    #[arg(short, long)]
    pub code: Option<String>,

    /// Inspect one code: limits, premium range, contract notes.
    #[arg(long, value_name = "CODE")]
    pub inspect: Option<String>,

    /// List the main-contract codes of one source document.
    #[arg(long, value_name = "FILE")]
    pub document: Option<String>,

    /// List the source documents known to the backend.
    #[arg(long)]
    pub list_documents: bool,

    /// Insured age.
    #[arg(short, long, default_value_t = DEFAULT_AGE, value_parser = clap::value_parser!(u32).range(15..))]
    pub age: u32,

    /// Base amount in units of 10,000 won.
    #[arg(short, long, default_value_t = DEFAULT_BASE_AMOUNT, value_parser = clap::value_parser!(u64).range(1..))]
    pub base_amount: u64,

    /// Backend base URL.
    #[arg(long, env = "INSUCALC_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Per-request timeout (e.g., "30s", "500ms", "1m").
    #[arg(long, env = "INSUCALC_TIMEOUT", default_value = "30s")]
    pub timeout: String,

    /// Answer lookups from a JSON backend snapshot instead of HTTP.
    #[arg(long, value_name = "JSON")]
    pub fixture: Option<PathBuf>,

    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Quiet mode (no headers, no progress bar).
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse the timeout flag.
    pub fn timeout_duration(&self) -> Result<Duration, ConfigError> {
        parse_duration(&self.timeout).ok_or_else(|| ConfigError::InvalidTimeout(self.timeout.clone()))
    }

    /// Whether any lookup mode was requested.
    #[must_use]
    pub fn has_action(&self) -> bool {
        self.code.is_some() || self.inspect.is_some() || self.document.is_some() || self.list_documents
    }

    /// Gateway options with the API base checked to be an HTTP(S) URL.
    pub fn gateway_options(&self) -> Result<GatewayOptions, ConfigError> {
        let opts = GatewayOptions {
            api_base: self.api_base.clone(),
            timeout: self.timeout_duration()?,
        }
        .normalize();
        validate_api_base(&opts.api_base)?;
        Ok(opts)
    }

    #[must_use]
    pub fn selection_defaults(&self) -> SelectionDefaults {
        SelectionDefaults {
            age: self.age,
            base_amount: self.base_amount,
        }
        .normalize()
    }
}

fn validate_api_base(api_base: &str) -> Result<(), ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidApiBase {
        url: api_base.to_string(),
        reason,
    };
    let url = Url::parse(api_base).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid("expected an http:// or https:// URL".to_string()));
    }
    Ok(())
}

/// Parse a duration string like "500ms", "30s", "5m", "1h".
///
/// A bare number is taken as seconds.
#[must_use]
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(Duration::from_millis(n))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(Duration::from_secs(n))
    } else if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(60)?))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(Duration::from_secs(n.checked_mul(3600)?))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(Duration::from_secs(n))
    }
}
