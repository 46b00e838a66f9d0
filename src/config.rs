//! Run configuration
//!
//! Raw inputs arrive as strings (flags or environment). This module turns
//! them into a validated `RunConfig` without touching the filesystem, the
//! environment, or the network, and reports the first bad field by the
//! environment key an operator would set.

use reconcile::{Credentials, ResourceKind, RunMode, RunPolicy};
use secrecy::SecretString;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment keys for every input
pub mod keys {
    pub const ACCOUNT: &str = "SNOWFLAKE_ACCOUNT";
    pub const USER: &str = "SNOWFLAKE_USERNAME";
    pub const PASSWORD: &str = "SNOWFLAKE_PASSWORD";
    pub const ROLE: &str = "SNOWFLAKE_ROLE";
    pub const WAREHOUSE: &str = "SNOWFLAKE_WAREHOUSE";
    pub const WORKSPACE: &str = "GITHUB_WORKSPACE";
    pub const RESOURCE_PATH: &str = "INPUT_RESOURCE-PATH";
    pub const DRY_RUN: &str = "INPUT_DRY-RUN";
    pub const RUN_MODE: &str = "INPUT_RUN-MODE";
    pub const RESOURCE_TYPES: &str = "INPUT_VALID-RESOURCE-TYPES";
    pub const ALLOW_ROLE_SWITCHING: &str = "INPUT_ALLOW-ROLE-SWITCHING";
    pub const IGNORE_OWNERSHIP: &str = "INPUT_IGNORE-OWNERSHIP";
    pub const ENGINE: &str = "SNOWSYNC_ENGINE";
}

/// Literal meaning "no resource-type filtering"
const ALL_RESOURCE_TYPES: &str = "all";

/// Unvalidated inputs, one field per environment key
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub account: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub warehouse: Option<String>,
    pub workspace: Option<String>,
    pub resource_path: Option<String>,
    pub dry_run: Option<String>,
    pub run_mode: Option<String>,
    pub resource_types: Option<String>,
    pub allow_role_switching: Option<String>,
    pub ignore_ownership: Option<String>,
}

/// A missing or malformed input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required input: {field}")]
    Missing { field: &'static str },

    #[error("invalid boolean for {field}: '{value}' (expected 'true' or 'false')")]
    InvalidBool { field: &'static str, value: String },

    #[error("unknown resource type in {field}: '{token}'")]
    UnknownResourceType { field: &'static str, token: String },

    #[error("invalid run mode for {field}: '{value}' (expected 'create-or-update' or 'sync')")]
    InvalidRunMode { field: &'static str, value: String },
}

impl ConfigError {
    /// Environment key of the offending input
    pub fn field(&self) -> &'static str {
        match self {
            ConfigError::Missing { field }
            | ConfigError::InvalidBool { field, .. }
            | ConfigError::UnknownResourceType { field, .. }
            | ConfigError::InvalidRunMode { field, .. } => field,
        }
    }
}

/// Everything one run needs, validated
#[derive(Debug)]
pub struct RunConfig {
    pub credentials: Credentials,
    pub workspace: PathBuf,
    pub resource_path: PathBuf,
    pub policy: RunPolicy,
}

impl RunConfig {
    /// Validate every input, in the order they appear in `keys`
    pub fn from_raw(raw: &RawInputs) -> Result<Self, ConfigError> {
        let credentials = Credentials {
            account: required(keys::ACCOUNT, &raw.account)?.to_string(),
            user: required(keys::USER, &raw.user)?.to_string(),
            password: SecretString::from(required(keys::PASSWORD, &raw.password)?.to_string()),
            role: required(keys::ROLE, &raw.role)?.to_string(),
            warehouse: required(keys::WAREHOUSE, &raw.warehouse)?.to_string(),
        };
        let workspace = PathBuf::from(required(keys::WORKSPACE, &raw.workspace)?);
        let resource_path = PathBuf::from(required(keys::RESOURCE_PATH, &raw.resource_path)?);
        let policy = build_policy(raw)?;

        Ok(Self {
            credentials,
            workspace,
            resource_path,
            policy,
        })
    }

    /// Directory discovery starts from
    pub fn resource_root(&self) -> PathBuf {
        resource_root(&self.workspace, &self.resource_path)
    }
}

/// Join the resource path onto the workspace (an absolute resource path wins)
pub fn resource_root(workspace: &Path, resource_path: &Path) -> PathBuf {
    workspace.join(resource_path)
}

/// Build the run policy from the policy-related inputs only
pub fn build_policy(raw: &RawInputs) -> Result<RunPolicy, ConfigError> {
    let dry_run = parse_bool(keys::DRY_RUN, required(keys::DRY_RUN, &raw.dry_run)?)?;

    let run_mode = match present(&raw.run_mode) {
        Some(value) => value
            .parse::<RunMode>()
            .map_err(|e| ConfigError::InvalidRunMode {
                field: keys::RUN_MODE,
                value: e.value,
            })?,
        None => RunMode::default(),
    };

    let resource_types = match present(&raw.resource_types) {
        Some(value) => parse_resource_types(value)?,
        None => BTreeSet::new(),
    };

    let allow_role_switching =
        optional_bool(keys::ALLOW_ROLE_SWITCHING, &raw.allow_role_switching, true)?;
    let ignore_ownership = optional_bool(keys::IGNORE_OWNERSHIP, &raw.ignore_ownership, true)?;

    Ok(RunPolicy::new(run_mode, dry_run)
        .with_resource_types(resource_types)
        .with_role_switching(allow_role_switching)
        .with_ignore_ownership(ignore_ownership))
}

/// Strict boolean: only `true` / `false`, case-insensitive
pub fn parse_bool(field: &'static str, value: &str) -> Result<bool, ConfigError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::InvalidBool {
            field,
            value: value.to_string(),
        })
    }
}

/// Parse `all` or a comma-separated list of resource kinds
///
/// `all` yields the empty set, which a `RunPolicy` reads as "no filter".
pub fn parse_resource_types(value: &str) -> Result<BTreeSet<ResourceKind>, ConfigError> {
    if value.trim().eq_ignore_ascii_case(ALL_RESOURCE_TYPES) {
        return Ok(BTreeSet::new());
    }

    value
        .split(',')
        .map(|token| {
            token
                .parse::<ResourceKind>()
                .map_err(|e| ConfigError::UnknownResourceType {
                    field: keys::RESOURCE_TYPES,
                    token: e.token.trim().to_string(),
                })
        })
        .collect()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn required<'a>(field: &'static str, value: &'a Option<String>) -> Result<&'a str, ConfigError> {
    present(value).ok_or(ConfigError::Missing { field })
}

fn optional_bool(
    field: &'static str,
    value: &Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    match present(value) {
        Some(v) => parse_bool(field, v),
        None => Ok(default),
    }
}
