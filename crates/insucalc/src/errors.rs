//! Error handling and exit codes.

use insucalc_core::constants::exit_codes;
use insucalc_core::error::MatrixError;
use insucalc_core::gateway::LookupError;
use insucalc_gateway::FixtureError;

use crate::config::ConfigError;

/// Exit code for a transport failure.
#[must_use]
pub fn lookup_exit_code(err: &LookupError) -> i32 {
    match err {
        LookupError::Timeout { .. } => exit_codes::ERROR_TIMEOUT,
        LookupError::NetworkUnavailable { .. } => exit_codes::ERROR_UNAVAILABLE,
        e if e.is_server_error() => exit_codes::ERROR_UNAVAILABLE,
        LookupError::Status { .. } | LookupError::Decode(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for an orchestration failure.
#[must_use]
pub fn matrix_exit_code(err: &MatrixError) -> i32 {
    match err {
        // In the CLI only an interrupt supersedes the running selection.
        MatrixError::Superseded | MatrixError::Cancelled => exit_codes::ERROR_CANCELED,
        MatrixError::InvalidInput(_) => exit_codes::ERROR_CONFIG,
        MatrixError::PrimaryUnavailable { source, .. } => lookup_exit_code(source),
        MatrixError::Resolution { .. }
        | MatrixError::ExpansionGap { .. }
        | MatrixError::Enrichment { .. } => exit_codes::ERROR_GENERIC,
    }
}

/// Map any application error to a process exit code.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(e) = err.downcast_ref::<MatrixError>() {
        matrix_exit_code(e)
    } else if let Some(e) = err.downcast_ref::<LookupError>() {
        lookup_exit_code(e)
    } else if err.downcast_ref::<ConfigError>().is_some() || err.downcast_ref::<FixtureError>().is_some() {
        exit_codes::ERROR_CONFIG
    } else {
        exit_codes::ERROR_GENERIC
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn network() -> LookupError {
        LookupError::NetworkUnavailable {
            url: "http://localhost:8082/api/product/1".into(),
            reason: "refused".into(),
        }
    }

    #[test]
    fn lookup_codes() {
        let timeout = LookupError::Timeout {
            url: String::new(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(lookup_exit_code(&timeout), 2);
        assert_eq!(lookup_exit_code(&network()), 5);
        let server = LookupError::Status {
            status: 503,
            body: String::new(),
        };
        assert_eq!(lookup_exit_code(&server), 5);
        let missing = LookupError::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(lookup_exit_code(&missing), 1);
    }

    #[test]
    fn matrix_codes() {
        assert_eq!(matrix_exit_code(&MatrixError::Superseded), 130);
        assert_eq!(matrix_exit_code(&MatrixError::InvalidInput("x".into())), 4);
        let primary = MatrixError::PrimaryUnavailable {
            code: "21686".into(),
            source: network(),
        };
        assert_eq!(matrix_exit_code(&primary), 5);
    }

    #[test]
    fn anyhow_downcasts() {
        assert_eq!(exit_code(&anyhow::Error::new(MatrixError::Superseded)), 130);
        assert_eq!(exit_code(&anyhow::Error::new(network())), 5);
        assert_eq!(exit_code(&anyhow::Error::new(ConfigError::NoAction)), 4);
        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }
}
