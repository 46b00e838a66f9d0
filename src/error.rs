//! Run errors, one variant per phase
//!
//! Every error ends the run. The kind decides the process exit code so CI
//! can tell a bad config from bad credentials.

use reconcile::{ApplyError, ConnectionError, EngineError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::scanner::DiscoveryError;

/// Errors that can end a run
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("plan error: {0}")]
    Plan(#[from] EngineError),

    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),
}

/// Coarse error category, used for exit codes and the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Discovery,
    Parse,
    Connection,
    Plan,
    Apply,
}

impl ErrorKind {
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::Config => 2,
            ErrorKind::Discovery => 3,
            ErrorKind::Parse => 4,
            ErrorKind::Connection => 5,
            ErrorKind::Plan => 6,
            ErrorKind::Apply => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "configuration",
            ErrorKind::Discovery => "discovery",
            ErrorKind::Parse => "parse",
            ErrorKind::Connection => "connection",
            ErrorKind::Plan => "plan",
            ErrorKind::Apply => "apply",
        }
    }
}

impl Error {
    /// The input key, file, or change the error is about, when known
    pub fn subject(&self) -> Option<String> {
        match self {
            Error::Config(e) => Some(e.field().to_string()),
            Error::Discovery(e) => Some(e.path().display().to_string()),
            Error::Apply(e) => e.urn.clone(),
            Error::Connection(_) | Error::Plan(_) => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Discovery(e) if e.is_parse() => ErrorKind::Parse,
            Error::Discovery(_) => ErrorKind::Discovery,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Plan(_) => ErrorKind::Plan,
            Error::Apply(_) => ErrorKind::Apply,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse_failures_have_their_own_kind() {
        let err = Error::from(DiscoveryError::Parse {
            path: PathBuf::from("roles.yml"),
            message: "bad indentation".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("roles.yml"));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let kinds = [
            ErrorKind::Config,
            ErrorKind::Discovery,
            ErrorKind::Parse,
            ErrorKind::Connection,
            ErrorKind::Plan,
            ErrorKind::Apply,
        ];
        let mut codes: Vec<_> = kinds.iter().map(ErrorKind::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
        assert!(!codes.contains(&1));
    }

    #[test]
    fn test_subject_names_offending_input() {
        let err = Error::from(ConfigError::InvalidBool {
            field: "INPUT_DRY-RUN",
            value: "yes".into(),
        });
        assert_eq!(err.subject().as_deref(), Some("INPUT_DRY-RUN"));

        let err = Error::from(DiscoveryError::Parse {
            path: PathBuf::from("snowflake/roles.yml"),
            message: "bad indentation".into(),
        });
        assert_eq!(err.subject().as_deref(), Some("snowflake/roles.yml"));

        let err = Error::from(ApplyError::new("insufficient privileges").at("urn::ACME:role/X"));
        assert_eq!(err.subject().as_deref(), Some("urn::ACME:role/X"));

        let err = Error::from(EngineError::Failed("warehouse suspended".into()));
        assert_eq!(err.subject(), None);
    }

    #[test]
    fn test_config_error_names_field() {
        let err = Error::from(ConfigError::Missing {
            field: "SNOWFLAKE_ROLE",
        });
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "configuration error: missing required input: SNOWFLAKE_ROLE"
        );
    }
}
