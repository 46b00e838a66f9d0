//! Subprocess engine - speaks JSON to an external engine program
//!
//! Each step runs `<program> <verb>` with one JSON request on stdin and
//! reads one JSON response from stdout:
//!
//! | verb         | request                                      | response                                             |
//! |--------------|----------------------------------------------|------------------------------------------------------|
//! | `connect`    | `{account, user, password, role, warehouse}` | `{session}`                                          |
//! | `plan`       | `{session, resources, policy}`               | `{changes: [{action, urn, details}], ...}`           |
//! | `apply`      | `{session, plan}`                            | `{created, modified, removed, transferred}`          |
//! | `disconnect` | `{session}`                                  | ignored                                              |
//!
//! A non-zero exit is a failure. The program may still print
//! `{"error": "...", "urn": "..."}` to stdout to say what went wrong.
//! The plan document is handed back to `apply` exactly as it was received.

use reconcile::{
    ApplyError, ApplySummary, Connection, ConnectionError, ConnectionFactory, Credentials,
    Engine, EngineError, PlanEntry, RenderPlan, ResourceDescriptor, RunPolicy,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use crate::runner::{self, CommandOutput};

/// Engine program used when none is configured
pub const DEFAULT_ENGINE: &str = "snowsync-engine";

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Serialize)]
struct ConnectRequest<'a> {
    account: &'a str,
    user: &'a str,
    password: &'a str,
    role: &'a str,
    warehouse: &'a str,
}

#[derive(Deserialize)]
struct ConnectResponse {
    session: String,
}

#[derive(Serialize)]
struct SessionRequest<'a> {
    session: &'a str,
}

#[derive(Serialize)]
struct PlanRequest<'a> {
    session: &'a str,
    resources: &'a [ResourceDescriptor],
    policy: &'a RunPolicy,
}

#[derive(Deserialize)]
struct PlanChanges {
    #[serde(default)]
    changes: Vec<PlanEntry>,
}

#[derive(Serialize)]
struct ApplyRequest<'a> {
    session: &'a str,
    plan: &'a Value,
}

#[derive(Deserialize, Default)]
struct FailureReport {
    error: Option<String>,
    urn: Option<String>,
}

impl FailureReport {
    fn from_output(output: &CommandOutput) -> Self {
        serde_json::from_slice(&output.stdout).unwrap_or_default()
    }

    fn message(&self, output: &CommandOutput) -> String {
        self.error
            .clone()
            .unwrap_or_else(|| output.failure_detail())
    }
}

// ============================================================================
// Connection
// ============================================================================

/// Opens sessions by running `<program> connect`
#[derive(Debug, Clone)]
pub struct CommandConnector {
    program: PathBuf,
}

impl CommandConnector {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ConnectionFactory for CommandConnector {
    type Connection = EngineSession;

    fn open(&self, credentials: &Credentials) -> Result<EngineSession, ConnectionError> {
        let request = ConnectRequest {
            account: &credentials.account,
            user: &credentials.user,
            password: credentials.password(),
            role: &credentials.role,
            warehouse: &credentials.warehouse,
        };
        let input =
            serde_json::to_vec(&request).map_err(|e| ConnectionError::Protocol(e.to_string()))?;

        log::debug!(
            "Connecting to account {} as {} via {}",
            credentials.account,
            credentials.user,
            self.program.display()
        );

        let output = runner::run_with_input(&self.program, &["connect"], input).map_err(|e| {
            ConnectionError::Unreachable(format!(
                "failed to run {}: {}",
                self.program.display(),
                e
            ))
        })?;

        if !output.success {
            let report = FailureReport::from_output(&output);
            return Err(ConnectionError::Rejected {
                account: credentials.account.clone(),
                user: credentials.user.clone(),
                message: report.message(&output),
            });
        }

        let response: ConnectResponse = serde_json::from_slice(&output.stdout)
            .map_err(|e| ConnectionError::Protocol(format!("invalid connect response: {}", e)))?;

        Ok(EngineSession {
            program: self.program.clone(),
            session: response.session,
            closed: false,
        })
    }
}

/// A session token issued by the engine program
#[derive(Debug)]
pub struct EngineSession {
    program: PathBuf,
    session: String,
    closed: bool,
}

impl EngineSession {
    pub fn token(&self) -> &str {
        &self.session
    }
}

impl Connection for EngineSession {
    fn close(&mut self) -> Result<(), ConnectionError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let input = serde_json::to_vec(&SessionRequest {
            session: &self.session,
        })
        .map_err(|e| ConnectionError::Protocol(e.to_string()))?;

        let output = runner::run_with_input(&self.program, &["disconnect"], input)?;
        if !output.success {
            return Err(ConnectionError::Protocol(format!(
                "disconnect failed: {}",
                output.failure_detail()
            )));
        }
        log::debug!("Session {} closed", self.token());
        Ok(())
    }
}

// ============================================================================
// Engine
// ============================================================================

/// A plan produced by the engine program
///
/// `raw` is the full response document. It is what `apply` receives.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandPlan {
    raw: Value,
    changes: Vec<PlanEntry>,
}

impl CommandPlan {
    fn from_value(raw: Value) -> Result<Self, EngineError> {
        let PlanChanges { changes } = serde_json::from_value(raw.clone())
            .map_err(|e| EngineError::Protocol(format!("invalid plan response: {}", e)))?;
        Ok(Self { raw, changes })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl RenderPlan for CommandPlan {
    fn entries(&self) -> Vec<PlanEntry> {
        self.changes.clone()
    }

    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Plans and applies through the session's engine program
#[derive(Debug, Default)]
pub struct CommandEngine;

impl Engine for CommandEngine {
    type Connection = EngineSession;
    type Plan = CommandPlan;

    fn plan(
        &mut self,
        connection: &mut EngineSession,
        resources: &[ResourceDescriptor],
        policy: &RunPolicy,
    ) -> Result<CommandPlan, EngineError> {
        let input = serde_json::to_vec(&PlanRequest {
            session: &connection.session,
            resources,
            policy,
        })
        .map_err(|e| EngineError::Protocol(e.to_string()))?;

        let output = runner::run_with_input(&connection.program, &["plan"], input)?;

        if !output.success {
            let report = FailureReport::from_output(&output);
            let message = report.message(&output);
            return Err(match report.urn {
                Some(urn) => EngineError::InvalidResource { urn, message },
                None => EngineError::Failed(message),
            });
        }

        let raw: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| EngineError::Protocol(format!("invalid plan response: {}", e)))?;
        let plan = CommandPlan::from_value(raw)?;
        log::debug!("Engine planned {} changes", plan.changes.len());
        Ok(plan)
    }

    fn apply(
        &mut self,
        connection: &mut EngineSession,
        plan: &CommandPlan,
    ) -> Result<ApplySummary, ApplyError> {
        let input = serde_json::to_vec(&ApplyRequest {
            session: &connection.session,
            plan: plan.raw(),
        })
        .map_err(|e| ApplyError::new(format!("could not encode plan: {}", e)))?;

        let output = runner::run_with_input(&connection.program, &["apply"], input).map_err(
            |e| {
                ApplyError::new(format!(
                    "failed to run {}: {}",
                    connection.program.display(),
                    e
                ))
            },
        )?;

        if !output.success {
            let report = FailureReport::from_output(&output);
            let error = ApplyError::new(report.message(&output));
            return Err(match report.urn {
                Some(urn) => error.at(urn),
                None => error,
            });
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| ApplyError::new(format!("invalid apply response: {}", e)))
    }
}
