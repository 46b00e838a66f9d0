//! # Reconcile
//!
//! The contract between a GitOps driver and a reconciliation engine for a
//! data-warehouse control plane.
//!
//! ## Core Concepts
//!
//! - **ResourceDescriptor**: One declared resource, normalized from config
//! - **RunPolicy**: What a single run may do (mode, dry run, kind filter)
//! - **Connection**: Opaque session with the remote system
//! - **Engine**: Computes a plan and applies it
//! - **RenderPlan**: How a plan is listed for an operator
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{ConnectionGuard, ConnectionFactory, Engine, RunPolicy};
//!
//! let conn = factory.open(&credentials)?;
//! let mut conn = ConnectionGuard::new(conn);
//! let plan = engine.plan(&mut conn, &resources, &policy)?;
//! for entry in plan.entries() {
//!     println!("{} {}", entry.action.symbol(), entry.urn);
//! }
//! if !policy.dry_run() {
//!     engine.apply(&mut conn, &plan)?;
//! }
//! conn.close()?;
//! ```
//!
//! ## Provider Traits
//!
//! - [`ConnectionFactory`]: Opens sessions from [`Credentials`]
//! - [`Connection`]: Releases the session when the run ends
//! - [`Engine`]: Plans and applies
//! - [`RenderPlan`]: Lists plan entries
//!
//! This keeps the driver free of any wire protocol or diff logic.

pub mod context;
pub mod engine;
pub mod error;
pub mod plan;
pub mod policy;
pub mod resource;
pub mod types;

// Re-export main types at crate root
pub use context::{Connection, ConnectionFactory, ConnectionGuard, Credentials};
pub use engine::Engine;
pub use error::{ApplyError, ConnectionError, EngineError, ParseKindError, ParseRunModeError};
pub use plan::{PlanEntry, PlanSummary, RenderPlan};
pub use policy::RunPolicy;
pub use resource::{Properties, ResourceDescriptor};
pub use types::{ApplySummary, ChangeAction, ResourceKind, RunMode};
