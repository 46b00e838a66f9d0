//! Run policy - how one invocation is allowed to reconcile

use serde::Serialize;
use std::collections::BTreeSet;

use crate::resource::ResourceDescriptor;
use crate::types::{ResourceKind, RunMode};

/// Immutable policy for a single run
///
/// The resource-type filter uses the empty set to mean "every kind".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPolicy {
    run_mode: RunMode,
    dry_run: bool,
    resource_type_filter: BTreeSet<ResourceKind>,
    allow_role_switching: bool,
    ignore_ownership: bool,
}

impl RunPolicy {
    /// Create a policy with the given mode and dry-run flag
    ///
    /// Role switching and ignoring ownership default to enabled; the filter
    /// defaults to all kinds.
    pub fn new(run_mode: RunMode, dry_run: bool) -> Self {
        Self {
            run_mode,
            dry_run,
            resource_type_filter: BTreeSet::new(),
            allow_role_switching: true,
            ignore_ownership: true,
        }
    }

    /// Restrict the run to the given kinds (an empty iterator keeps "all")
    pub fn with_resource_types<I: IntoIterator<Item = ResourceKind>>(mut self, kinds: I) -> Self {
        self.resource_type_filter = kinds.into_iter().collect();
        self
    }

    pub fn with_role_switching(mut self, allow: bool) -> Self {
        self.allow_role_switching = allow;
        self
    }

    pub fn with_ignore_ownership(mut self, ignore: bool) -> Self {
        self.ignore_ownership = ignore;
        self
    }

    pub fn run_mode(&self) -> RunMode {
        self.run_mode
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Allowed kinds; empty means no filtering
    pub fn resource_type_filter(&self) -> &BTreeSet<ResourceKind> {
        &self.resource_type_filter
    }

    pub fn allow_role_switching(&self) -> bool {
        self.allow_role_switching
    }

    pub fn ignore_ownership(&self) -> bool {
        self.ignore_ownership
    }

    /// Whether every kind is in scope
    pub fn allows_all(&self) -> bool {
        self.resource_type_filter.is_empty()
    }

    /// Whether resources of `kind` are in scope for this run
    pub fn allows(&self, kind: ResourceKind) -> bool {
        self.allows_all() || self.resource_type_filter.contains(&kind)
    }

    /// Whether a declared resource is in scope for this run
    pub fn matches(&self, resource: &ResourceDescriptor) -> bool {
        self.allows(resource.kind())
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self::new(RunMode::default(), false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Properties;

    #[test]
    fn test_default_policy_allows_everything() {
        let policy = RunPolicy::default();
        assert!(policy.allows_all());
        assert!(policy.allows(ResourceKind::Database));
        assert!(policy.allow_role_switching());
        assert!(policy.ignore_ownership());
        assert!(!policy.dry_run());
        assert_eq!(policy.run_mode(), RunMode::CreateOrUpdate);
    }

    #[test]
    fn test_filter_restricts_kinds() {
        let policy = RunPolicy::new(RunMode::Sync, true)
            .with_resource_types([ResourceKind::Role, ResourceKind::RoleGrant]);

        assert!(!policy.allows_all());
        assert!(policy.allows(ResourceKind::Role));
        assert!(!policy.allows(ResourceKind::Warehouse));

        let wh = ResourceDescriptor::new(ResourceKind::Warehouse, Properties::new(), "wh.yml");
        assert!(!policy.matches(&wh));
    }

    #[test]
    fn test_serializes_for_engine() {
        let policy = RunPolicy::new(RunMode::Sync, false)
            .with_resource_types([ResourceKind::User])
            .with_ignore_ownership(false);
        let value = serde_json::to_value(&policy).unwrap();
        assert_eq!(value["run_mode"], "sync");
        assert_eq!(value["resource_type_filter"], serde_json::json!(["user"]));
        assert_eq!(value["ignore_ownership"], false);
    }
}
