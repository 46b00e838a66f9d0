//! Reconciliation engine for snowsync
//!
//! The engine side of a run:
//! 1. Driving - Config, discovery, connect, plan, apply, in that order
//! 2. Rendering - The plan as an operator reads it
//! 3. Command - The engine program behind the connection

pub mod command;
pub mod driver;
pub mod render;

pub use command::{CommandConnector, CommandEngine, DEFAULT_ENGINE};
pub use driver::{Driver, Reporter, RunOutcome};
