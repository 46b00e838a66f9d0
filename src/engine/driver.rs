//! Reconciliation driver - the plan-then-apply sequence for one run
//!
//! Steps run strictly in order and any failure ends the run:
//! 1. Build the run config and policy (no I/O)
//! 2. Discover declared resources
//! 3. Open the remote connection
//! 4. Ask the engine for a plan
//! 5. Render the plan
//! 6. Stop here on dry run, otherwise apply the same plan
//!
//! The connection is held by a guard, so it is released on every exit path.

use std::fmt;

use reconcile::{
    ApplySummary, ConnectionFactory, ConnectionGuard, Engine, RenderPlan, ResourceDescriptor,
};

use super::render::render_plan;
use crate::config::{RawInputs, RunConfig};
use crate::error::Error;
use crate::scanner::{self, PluralKeyExtractor};

/// Where a run is in its sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Init,
    PolicyBuilt,
    ResourcesDiscovered,
    Connected,
    Planned,
    /// Dry run: plan shown, apply skipped
    Stopped,
    Applied,
    Done,
    Failed(String),
}

impl RunState {
    /// `Done` and `Failed` end a run
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Init => write!(f, "init"),
            RunState::PolicyBuilt => write!(f, "policy-built"),
            RunState::ResourcesDiscovered => write!(f, "resources-discovered"),
            RunState::Connected => write!(f, "connected"),
            RunState::Planned => write!(f, "planned"),
            RunState::Stopped => write!(f, "stopped"),
            RunState::Applied => write!(f, "applied"),
            RunState::Done => write!(f, "done"),
            RunState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Plan computed and shown; nothing applied
    DryRun { planned: usize },
    /// Plan applied
    Applied(ApplySummary),
}

/// Receives what a run produces, in order
///
/// Implement this to print, log, or record. Every method but `plan` has a
/// no-op default.
pub trait Reporter {
    /// The validated configuration, before discovery
    fn config(&mut self, _config: &RunConfig) {}

    /// The discovered resource set, before connecting
    fn resources(&mut self, _resources: &[ResourceDescriptor]) {}

    /// The rendered plan, before any mutation
    fn plan(&mut self, rendered: &str);

    /// Dry run stopped after the plan
    fn dry_run(&mut self) {}

    /// Apply finished successfully
    fn applied(&mut self, _summary: &ApplySummary) {}
}

/// Drives one reconciliation run
pub struct Driver<'a, F, E, R>
where
    F: ConnectionFactory,
    E: Engine<Connection = F::Connection>,
    R: Reporter,
{
    connections: &'a F,
    engine: &'a mut E,
    reporter: &'a mut R,
    state: RunState,
}

impl<'a, F, E, R> Driver<'a, F, E, R>
where
    F: ConnectionFactory,
    E: Engine<Connection = F::Connection>,
    R: Reporter,
{
    pub fn new(connections: &'a F, engine: &'a mut E, reporter: &'a mut R) -> Self {
        Self {
            connections,
            engine,
            reporter,
            state: RunState::Init,
        }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Run the full sequence once
    pub fn run(&mut self, raw: &RawInputs) -> Result<RunOutcome, Error> {
        let result = self.sequence(raw);
        match &result {
            Ok(_) => self.transition(RunState::Done),
            Err(e) => self.transition(RunState::Failed(e.to_string())),
        }
        result
    }

    fn sequence(&mut self, raw: &RawInputs) -> Result<RunOutcome, Error> {
        let config = RunConfig::from_raw(raw)?;
        self.transition(RunState::PolicyBuilt);
        self.reporter.config(&config);

        let root = config.resource_root();
        let resources = scanner::discover(&root, &PluralKeyExtractor)?;
        self.transition(RunState::ResourcesDiscovered);
        log::info!(
            "Discovered {} resources under {}",
            resources.len(),
            root.display()
        );
        self.reporter.resources(&resources);

        let mut conn = ConnectionGuard::new(self.connections.open(&config.credentials)?);
        self.transition(RunState::Connected);

        let plan = self.engine.plan(&mut conn, &resources, &config.policy)?;
        self.transition(RunState::Planned);
        self.reporter.plan(&render_plan(&plan));

        if config.policy.dry_run() {
            self.transition(RunState::Stopped);
            self.reporter.dry_run();
            release(conn);
            return Ok(RunOutcome::DryRun {
                planned: plan.entries().len(),
            });
        }

        let summary = self.engine.apply(&mut conn, &plan)?;
        self.transition(RunState::Applied);
        self.reporter.applied(&summary);
        release(conn);

        Ok(RunOutcome::Applied(summary))
    }

    fn transition(&mut self, next: RunState) {
        log::debug!("Run state: {} -> {}", self.state, next);
        self.state = next;
    }
}

/// Close after a successful run; a failed close does not undo the run
fn release<C: reconcile::Connection>(conn: ConnectionGuard<C>) {
    if let Err(e) = conn.close() {
        log::warn!("Failed to close connection: {}", e);
    }
}
