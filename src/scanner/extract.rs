//! Resource extraction - turns a parsed config document into descriptors
//!
//! The default layout groups resources under the plural name of their kind:
//!
//! ```yaml
//! roles:
//!   - name: ANALYST
//! role_grants:
//!   - role: ANALYST
//!     to_role: SYSADMIN
//! ```

use reconcile::{Properties, ResourceDescriptor, ResourceKind};
use serde_yaml::{Mapping, Value};
use std::path::Path;
use thiserror::Error;

/// Why a document could not be turned into resources
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unknown resource key '{0}'")]
    UnknownKey(String),

    #[error("top-level keys must be strings")]
    NonStringKey,

    #[error("'{key}' must be a list of resources")]
    NotAList { key: String },

    #[error("'{key}' entry {index} must be a mapping")]
    NotAMapping { key: String, index: usize },

    #[error("'{key}' entry {index}: property names must be strings")]
    NonStringProperty { key: String, index: usize },

    #[error("'{key}' entry {index}: property '{property}' has an unsupported value: {message}")]
    InvalidValue {
        key: String,
        index: usize,
        property: String,
        message: String,
    },
}

/// Turns one parsed document into zero or more resources
pub trait ResourceExtractor {
    fn extract(
        &self,
        document: &Mapping,
        source: &Path,
    ) -> Result<Vec<ResourceDescriptor>, ExtractError>;
}

/// Extractor for documents keyed by plural resource kind
#[derive(Debug, Clone, Copy, Default)]
pub struct PluralKeyExtractor;

impl ResourceExtractor for PluralKeyExtractor {
    fn extract(
        &self,
        document: &Mapping,
        source: &Path,
    ) -> Result<Vec<ResourceDescriptor>, ExtractError> {
        let mut resources = Vec::new();

        for (key, value) in document {
            let key = key.as_str().ok_or(ExtractError::NonStringKey)?;
            let kind = ResourceKind::from_plural_key(key)
                .ok_or_else(|| ExtractError::UnknownKey(key.to_string()))?;

            let items = match value {
                Value::Null => continue,
                Value::Sequence(items) => items,
                _ => {
                    return Err(ExtractError::NotAList {
                        key: key.to_string(),
                    });
                }
            };

            for (index, item) in items.iter().enumerate() {
                let properties = to_properties(key, index, item)?;
                resources.push(ResourceDescriptor::new(kind, properties, source));
            }
        }

        Ok(resources)
    }
}

fn to_properties(key: &str, index: usize, item: &Value) -> Result<Properties, ExtractError> {
    let Value::Mapping(mapping) = item else {
        return Err(ExtractError::NotAMapping {
            key: key.to_string(),
            index,
        });
    };

    let mut properties = Properties::new();
    for (name, value) in mapping {
        let name = name.as_str().ok_or_else(|| ExtractError::NonStringProperty {
            key: key.to_string(),
            index,
        })?;
        let value = serde_json::to_value(value).map_err(|e| ExtractError::InvalidValue {
            key: key.to_string(),
            index,
            property: name.to_string(),
            message: e.to_string(),
        })?;
        properties.insert(name.to_string(), value);
    }
    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn extract(yaml: &str) -> Result<Vec<ResourceDescriptor>, ExtractError> {
        PluralKeyExtractor.extract(&parse(yaml), Path::new("resources/main.yml"))
    }

    #[test]
    fn test_extracts_one_descriptor_per_item() {
        let resources = extract(
            r#"
databases:
  - name: ANALYTICS
    comment: BI data
    data_retention_time_in_days: 7
  - name: RAW
role_grants:
  - role: ANALYST
    roles: [SYSADMIN]
"#,
        )
        .unwrap();

        assert_eq!(resources.len(), 3);
        assert_eq!(resources[0].kind(), ResourceKind::Database);
        assert_eq!(resources[0].property("data_retention_time_in_days"), Some(&json!(7)));
        assert_eq!(resources[1].name(), Some("RAW"));
        assert_eq!(resources[2].kind(), ResourceKind::RoleGrant);
        assert_eq!(resources[2].property("roles"), Some(&json!(["SYSADMIN"])));
        assert!(resources.iter().all(|r| r.source() == Path::new("resources/main.yml")));
    }

    #[test]
    fn test_null_section_declares_nothing() {
        let resources = extract("users:\nroles: []\n").unwrap();
        assert!(resources.is_empty());
    }

    #[test]
    fn test_nested_structures_are_kept() {
        let resources = extract(
            r#"
warehouses:
  - name: LOAD_WH
    tags:
      cost_center: data-eng
    auto_resume: true
"#,
        )
        .unwrap();
        assert_eq!(
            resources[0].property("tags"),
            Some(&json!({"cost_center": "data-eng"}))
        );
        assert_eq!(resources[0].property("auto_resume"), Some(&json!(true)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = extract("database:\n  - name: X\n").unwrap_err();
        assert!(matches!(err, ExtractError::UnknownKey(ref k) if k == "database"));
    }

    #[test]
    fn test_section_must_be_a_list() {
        let err = extract("roles:\n  name: ANALYST\n").unwrap_err();
        assert!(matches!(err, ExtractError::NotAList { ref key } if key == "roles"));
    }

    #[test]
    fn test_items_must_be_mappings() {
        let err = extract("roles:\n  - ANALYST\n").unwrap_err();
        assert!(matches!(err, ExtractError::NotAMapping { index: 0, .. }));
    }

    #[test]
    fn test_property_names_must_be_strings() {
        let err = extract("roles:\n  - 1: ANALYST\n").unwrap_err();
        assert!(matches!(err, ExtractError::NonStringProperty { index: 0, .. }));
    }
}
