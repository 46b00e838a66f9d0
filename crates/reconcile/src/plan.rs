//! Plan inspection
//!
//! Plans belong to the engine. The only thing the driver asks of a plan is
//! a listing of its entries, in the order the engine will apply them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ChangeAction;

/// One planned change, as shown to an operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    /// What will happen to the resource
    pub action: ChangeAction,
    /// Engine identifier of the resource (e.g. "urn::ACME:database/ANALYTICS")
    pub urn: String,
    /// Rendered property changes, sorted by property name
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl PlanEntry {
    pub fn new(action: ChangeAction, urn: impl Into<String>) -> Self {
        Self {
            action,
            urn: urn.into(),
            details: BTreeMap::new(),
        }
    }

    /// Add a property detail line
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Anything the driver can show before applying
pub trait RenderPlan {
    /// Entries in apply order
    fn entries(&self) -> Vec<PlanEntry>;

    /// Whether the plan would change nothing
    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Per-action counts for a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSummary {
    pub additions: usize,
    pub changes: usize,
    pub removals: usize,
    pub transfers: usize,
}

impl PlanSummary {
    pub fn from_entries(entries: &[PlanEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.action {
                ChangeAction::Add => summary.additions += 1,
                ChangeAction::Change => summary.changes += 1,
                ChangeAction::Remove => summary.removals += 1,
                ChangeAction::Transfer => summary.transfers += 1,
            }
        }
        summary
    }

    /// Total number of changes
    pub fn total(&self) -> usize {
        self.additions + self.changes + self.removals + self.transfers
    }

    /// Check if there are any changes
    pub fn has_changes(&self) -> bool {
        self.total() > 0
    }
}
