//! Error types for the engine contract
//!
//! Each phase that crosses the engine boundary has its own error type so
//! callers can tell "bad credentials or network" apart from "the engine
//! could not plan" and "a planned change failed".

use std::fmt;
use thiserror::Error;

/// A resource-type token outside the closed set of kinds
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown resource type: '{token}'")]
pub struct ParseKindError {
    /// The token as it was given
    pub token: String,
}

/// A run mode other than `create-or-update` or `sync`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown run mode: '{value}' (expected 'create-or-update' or 'sync')")]
pub struct ParseRunModeError {
    pub value: String,
}

/// Opening, using, or closing the remote session failed
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// The remote system refused the session (bad credentials, locked user, ...)
    #[error("connection rejected for user '{user}' on account '{account}': {message}")]
    Rejected {
        account: String,
        user: String,
        message: String,
    },

    /// The remote system could not be reached
    #[error("could not reach remote system: {0}")]
    Unreachable(String),

    /// The session answered with something unexpected
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Local IO error while talking to the session
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The engine could not produce a plan
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine rejected one of the declared resources
    #[error("invalid resource '{urn}': {message}")]
    InvalidResource { urn: String, message: String },

    /// The engine failed while computing the plan
    #[error("planning failed: {0}")]
    Failed(String),

    /// The engine answered with something unexpected
    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A planned change failed while applying
#[derive(Debug)]
pub struct ApplyError {
    /// Identifier of the planned change that failed, when the engine reports it
    pub urn: Option<String>,
    /// Engine-reported failure detail
    pub message: String,
}

impl ApplyError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            urn: None,
            message: message.into(),
        }
    }

    /// Attach the identifier of the failing change
    pub fn at(mut self, urn: impl Into<String>) -> Self {
        self.urn = Some(urn.into());
        self
    }
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.urn {
            Some(urn) => write!(f, "change '{}' failed: {}", urn, self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ApplyError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_error_names_failing_change() {
        let err = ApplyError::new("insufficient privileges").at("urn::db/ANALYTICS");
        assert_eq!(
            err.to_string(),
            "change 'urn::db/ANALYTICS' failed: insufficient privileges"
        );
    }

    #[test]
    fn test_apply_error_without_urn() {
        let err = ApplyError::new("session expired");
        assert_eq!(err.to_string(), "session expired");
    }
}
