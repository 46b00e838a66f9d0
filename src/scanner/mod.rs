//! Config discovery - finds YAML files and extracts declared resources
//!
//! Traversal is sorted by file name so the same tree always yields the
//! same resource order. Empty files are skipped; anything that fails to
//! parse fails the whole discovery.

pub mod extract;

use reconcile::ResourceDescriptor;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub use extract::{ExtractError, PluralKeyExtractor, ResourceExtractor};

/// File name suffixes treated as structured config
const CONFIG_SUFFIXES: &[&str] = &[".yaml", ".yml"];

/// Errors that can occur while discovering resources
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Directory tree could not be walked
    #[error("cannot traverse {}: {source}", .path.display())]
    Traverse {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Config file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid UTF-8 YAML, or not a mapping
    #[error("failed to parse YAML in {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// A parsed document does not describe valid resources
    #[error("invalid resource in {}: {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
}

impl DiscoveryError {
    /// File or directory the error is about
    pub fn path(&self) -> &Path {
        match self {
            DiscoveryError::Traverse { path, .. }
            | DiscoveryError::Read { path, .. }
            | DiscoveryError::Parse { path, .. }
            | DiscoveryError::Extract { path, .. } => path,
        }
    }

    /// Whether the error is about file contents rather than the filesystem
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Parse { .. } | DiscoveryError::Extract { .. }
        )
    }
}

/// Discover every declared resource under `root`
pub fn discover(
    root: &Path,
    extractor: &dyn ResourceExtractor,
) -> Result<Vec<ResourceDescriptor>, DiscoveryError> {
    let mut resources = Vec::new();

    for path in crawl(root)? {
        log::info!("Reading config file: {}", path.display());

        let bytes = fs::read(&path).map_err(|source| DiscoveryError::Read {
            path: path.clone(),
            source,
        })?;
        let content = String::from_utf8(bytes).map_err(|e| DiscoveryError::Parse {
            path: path.clone(),
            message: format!("not valid UTF-8: {}", e.utf8_error()),
        })?;

        let documents = parse_documents(&content, &path)?;
        if documents.is_empty() {
            log::info!("Skipping empty config file: {}", path.display());
            continue;
        }

        for document in &documents {
            let extracted =
                extractor
                    .extract(document, &path)
                    .map_err(|source| DiscoveryError::Extract {
                        path: path.clone(),
                        source,
                    })?;
            log::debug!(
                "Extracted {} resources from {}",
                extracted.len(),
                path.display()
            );
            resources.extend(extracted);
        }
    }

    Ok(resources)
}

/// List config files under `root`, sorted by path
pub fn crawl(root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|source| DiscoveryError::Traverse {
            path: source.path().unwrap_or(root).to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if entry.file_type().is_dir() || !is_config_file(path) {
            continue;
        }
        // Symlinks count when they point at a regular file
        if path.is_file() {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Whether the file name ends with a recognized config suffix
pub fn is_config_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| CONFIG_SUFFIXES.iter().any(|s| name.ends_with(s)))
}

/// Parse every non-empty YAML document in `content` as a mapping
fn parse_documents(content: &str, path: &Path) -> Result<Vec<Mapping>, DiscoveryError> {
    let mut documents = Vec::new();
    if content.trim().is_empty() {
        return Ok(documents);
    }

    for document in serde_yaml::Deserializer::from_str(content) {
        let value = Value::deserialize(document).map_err(|e| DiscoveryError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        match value {
            Value::Null => {}
            Value::Mapping(mapping) if mapping.is_empty() => {}
            Value::Mapping(mapping) => documents.push(mapping),
            other => {
                return Err(DiscoveryError::Parse {
                    path: path.to_path_buf(),
                    message: format!("expected a mapping, found {}", value_kind(&other)),
                });
            }
        }
    }

    Ok(documents)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::ResourceKind;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn discover_in(dir: &Path) -> Result<Vec<ResourceDescriptor>, DiscoveryError> {
        discover(dir, &PluralKeyExtractor)
    }

    #[test]
    fn test_only_non_matching_files_yields_empty_set() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "README.md", "# resources");
        write_file(tmp.path(), "nested/config.json", "{\"roles\": []}");
        write_file(tmp.path(), "notes.yaml.bak", "roles: [{name: X}]");

        let resources = discover_in(tmp.path()).unwrap();
        assert!(resources.is_empty());
    }

    #[test]
    fn test_empty_directory_yields_empty_set() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_in(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_file_is_skipped() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "a.yaml", "databases:\n  - name: ANALYTICS\n");
        write_file(tmp.path(), "b.yml", "");

        let resources = discover_in(tmp.path()).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].kind(), ResourceKind::Database);
        assert_eq!(resources[0].name(), Some("ANALYTICS"));
        assert_eq!(resources[0].source(), tmp.path().join("a.yaml"));
    }

    #[test]
    fn test_comment_only_and_null_documents_are_skipped() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "comments.yml", "# nothing declared yet\n");
        write_file(tmp.path(), "null.yml", "~\n");
        write_file(tmp.path(), "braces.yml", "{}\n");
        write_file(tmp.path(), "roles.yml", "roles:\n  - name: ANALYST\n");

        let resources = discover_in(tmp.path()).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].name(), Some("ANALYST"));
    }

    #[test]
    fn test_invalid_yaml_names_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "good.yml", "roles:\n  - name: ANALYST\n");
        write_file(tmp.path(), "broken.yaml", "roles: [name: X\n  - : :\n");

        let err = discover_in(tmp.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Parse { .. }));
        assert!(err.is_parse());
        assert_eq!(err.path(), tmp.path().join("broken.yaml"));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn test_non_utf8_file_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("bad.yaml"), b"roles:\n  - name: \xff\xfe\n").unwrap();

        let err = discover_in(tmp.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Parse { .. }));
        assert!(err.is_parse());
        assert_eq!(err.path(), tmp.path().join("bad.yaml"));
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_non_mapping_document_is_a_parse_error() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "list.yml", "- name: ANALYST\n");

        let err = discover_in(tmp.path()).unwrap_err();
        match err {
            DiscoveryError::Parse { path, message } => {
                assert_eq!(path, tmp.path().join("list.yml"));
                assert!(message.contains("expected a mapping"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_extraction_failure_names_file() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "typo.yml", "rolez:\n  - name: ANALYST\n");

        let err = discover_in(tmp.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Extract { .. }));
        assert_eq!(err.path(), tmp.path().join("typo.yml"));
        assert!(err.to_string().contains("rolez"));
    }

    #[test]
    fn test_missing_root_is_traverse_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does-not-exist");

        let err = discover_in(&missing).unwrap_err();
        assert!(matches!(err, DiscoveryError::Traverse { .. }));
        assert!(!err.is_parse());
        assert_eq!(err.path(), missing);
    }

    #[test]
    fn test_order_is_lexicographic_by_path() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "b/users.yml", "users:\n  - name: B_USER\n");
        write_file(tmp.path(), "a.yml", "roles:\n  - name: A_ROLE\n");
        write_file(tmp.path(), "c.yaml", "warehouses:\n  - name: C_WH\n");
        write_file(tmp.path(), "b/a/dbs.yaml", "databases:\n  - name: BA_DB\n");

        let names: Vec<_> = discover_in(tmp.path())
            .unwrap()
            .iter()
            .map(|r| r.name().unwrap().to_string())
            .collect();
        assert_eq!(names, ["A_ROLE", "BA_DB", "B_USER", "C_WH"]);

        // Same tree, same order
        let again: Vec<_> = discover_in(tmp.path())
            .unwrap()
            .iter()
            .map(|r| r.name().unwrap().to_string())
            .collect();
        assert_eq!(names, again);
    }

    #[test]
    fn test_multi_document_file() {
        let tmp = TempDir::new().unwrap();
        write_file(
            tmp.path(),
            "all.yml",
            "roles:\n  - name: ANALYST\n---\n---\nwarehouses:\n  - name: BI_WH\n    warehouse_size: XSMALL\n",
        );

        let resources = discover_in(tmp.path()).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].kind(), ResourceKind::Role);
        assert_eq!(resources[1].kind(), ResourceKind::Warehouse);
        assert_eq!(resources[1].property("warehouse_size").unwrap(), "XSMALL");
    }

    #[test]
    fn test_is_config_file() {
        assert!(is_config_file(Path::new("a/b/roles.yaml")));
        assert!(is_config_file(Path::new("roles.yml")));
        assert!(!is_config_file(Path::new("roles.YAML.txt")));
        assert!(!is_config_file(Path::new("roles.json")));
        assert!(!is_config_file(Path::new("yaml")));
    }
}
