//! Reconciliation engine contract
//!
//! The engine is the sole authority on what must change. It reads live
//! state through the connection, compares it with the declared resources
//! under the given policy, and returns a plan. Applying takes that same
//! plan back, unmodified.

use crate::error::{ApplyError, EngineError};
use crate::plan::RenderPlan;
use crate::policy::RunPolicy;
use crate::resource::ResourceDescriptor;
use crate::types::ApplySummary;

/// A plan-then-apply reconciliation engine
///
/// # Type Parameters
/// * `Connection` - Session type the engine talks through
/// * `Plan` - Engine-owned plan representation
pub trait Engine {
    type Connection;
    type Plan: RenderPlan;

    /// Compute the changes needed to reconcile `resources` with live state
    fn plan(
        &mut self,
        connection: &mut Self::Connection,
        resources: &[ResourceDescriptor],
        policy: &RunPolicy,
    ) -> Result<Self::Plan, EngineError>;

    /// Execute a plan previously returned by [`Engine::plan`]
    fn apply(
        &mut self,
        connection: &mut Self::Connection,
        plan: &Self::Plan,
    ) -> Result<ApplySummary, ApplyError>;
}
