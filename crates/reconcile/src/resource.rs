//! Declared resources, normalized for the engine
//!
//! A `ResourceDescriptor` is what a config file says about one resource:
//! its kind, the properties it declares, and the file it came from. It
//! carries no live state; comparing against the remote system is the
//! engine's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::types::ResourceKind;

/// Declared properties, sorted by key
pub type Properties = BTreeMap<String, Value>;

/// One declared resource extracted from a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    properties: Properties,
    source: PathBuf,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, properties: Properties, source: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            properties,
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Look up a single declared property
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// File the resource was declared in
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// The declared `name` property, if it is a string
    pub fn name(&self) -> Option<&str> {
        self.property("name").and_then(Value::as_str)
    }
}

impl fmt::Display for ResourceDescriptor {
    /// `kind:name`, or `kind:<unnamed>` for resources without a name (grants)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name().unwrap_or("<unnamed>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(pairs: &[(&str, Value)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_display_uses_name() {
        let db = ResourceDescriptor::new(
            ResourceKind::Database,
            props(&[("name", json!("ANALYTICS")), ("comment", json!("bi"))]),
            "resources/dbs.yml",
        );
        assert_eq!(db.to_string(), "database:ANALYTICS");
        assert_eq!(db.source(), Path::new("resources/dbs.yml"));
    }

    #[test]
    fn test_display_without_name() {
        let grant = ResourceDescriptor::new(
            ResourceKind::RoleGrant,
            props(&[("role", json!("ANALYST")), ("to_role", json!("SYSADMIN"))]),
            "grants.yaml",
        );
        assert_eq!(grant.name(), None);
        assert_eq!(grant.to_string(), "role_grant:<unnamed>");
    }

    #[test]
    fn test_serializes_kind_as_snake_case() {
        let wh = ResourceDescriptor::new(
            ResourceKind::Warehouse,
            props(&[("name", json!("LOAD_WH")), ("auto_suspend", json!(60))]),
            "wh.yaml",
        );
        let value = serde_json::to_value(&wh).unwrap();
        assert_eq!(value["kind"], "warehouse");
        assert_eq!(value["properties"]["auto_suspend"], 60);
        assert_eq!(value["source"], "wh.yaml");
    }
}
