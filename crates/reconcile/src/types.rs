//! Core types for plan-then-apply reconciliation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ParseKindError, ParseRunModeError};

macro_rules! resource_kinds {
    ($($variant:ident => $name:literal, $plural:literal;)+) => {
        /// Closed set of resource kinds the engine knows how to reconcile
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum ResourceKind {
            $($variant,)+
        }

        impl ResourceKind {
            /// Every kind, in declaration order
            pub const ALL: &'static [ResourceKind] = &[$(ResourceKind::$variant,)+];

            /// Canonical snake_case name (e.g. "role_grant")
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ResourceKind::$variant => $name,)+
                }
            }

            /// Top-level key introducing this kind in a config file (e.g. "role_grants")
            pub fn plural_key(&self) -> &'static str {
                match self {
                    $(ResourceKind::$variant => $plural,)+
                }
            }

            /// Look up a kind by its plural config key
            pub fn from_plural_key(key: &str) -> Option<Self> {
                match key {
                    $($plural => Some(ResourceKind::$variant),)+
                    _ => None,
                }
            }
        }

        impl FromStr for ResourceKind {
            type Err = ParseKindError;

            /// Case-insensitive; spaces and hyphens count as underscores
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let normalized: String = s
                    .trim()
                    .chars()
                    .map(|c| match c {
                        ' ' | '-' => '_',
                        c => c.to_ascii_lowercase(),
                    })
                    .collect();
                match normalized.as_str() {
                    $($name => Ok(ResourceKind::$variant),)+
                    _ => Err(ParseKindError {
                        token: s.to_string(),
                    }),
                }
            }
        }
    };
}

resource_kinds! {
    AccountParameter => "account_parameter", "account_parameters";
    Database => "database", "databases";
    Schema => "schema", "schemas";
    Role => "role", "roles";
    DatabaseRole => "database_role", "database_roles";
    RoleGrant => "role_grant", "role_grants";
    Grant => "grant", "grants";
    User => "user", "users";
    Warehouse => "warehouse", "warehouses";
    Table => "table", "tables";
    View => "view", "views";
    Stage => "stage", "stages";
    FileFormat => "file_format", "file_formats";
    Sequence => "sequence", "sequences";
    Stream => "stream", "streams";
    Task => "task", "tasks";
    Pipe => "pipe", "pipes";
    Function => "function", "functions";
    Procedure => "procedure", "procedures";
    NetworkPolicy => "network_policy", "network_policies";
    ResourceMonitor => "resource_monitor", "resource_monitors";
    Share => "share", "shares";
    Tag => "tag", "tags";
    Secret => "secret", "secrets";
    ExternalAccessIntegration => "external_access_integration", "external_access_integrations";
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the engine treats live resources missing from the declared set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Create and update declared resources, leave everything else alone
    #[default]
    CreateOrUpdate,
    /// Full sync: also remove owned resources that are no longer declared
    Sync,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::CreateOrUpdate => "create-or-update",
            RunMode::Sync => "sync",
        }
    }
}

impl FromStr for RunMode {
    type Err = ParseRunModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "create-or-update" => Ok(RunMode::CreateOrUpdate),
            "sync" => Ok(RunMode::Sync),
            _ => Err(ParseRunModeError {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of change an engine plans for one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    /// Resource will be created
    Add,
    /// Resource exists and will be altered
    Change,
    /// Resource will be dropped
    Remove,
    /// Ownership of the resource will move to another role
    Transfer,
}

impl ChangeAction {
    /// Single-character marker used in plan listings
    pub fn symbol(&self) -> char {
        match self {
            ChangeAction::Add => '+',
            ChangeAction::Change => '~',
            ChangeAction::Remove => '-',
            ChangeAction::Transfer => '>',
        }
    }
}

/// Summary of a successful apply, as reported by the engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplySummary {
    #[serde(default)]
    pub created: usize,
    #[serde(default)]
    pub modified: usize,
    #[serde(default)]
    pub removed: usize,
    #[serde(default)]
    pub transferred: usize,
}

impl ApplySummary {
    /// Total number of changes applied
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed + self.transferred
    }

    /// Count one applied change
    pub fn add_action(&mut self, action: ChangeAction) {
        match action {
            ChangeAction::Add => self.created += 1,
            ChangeAction::Change => self.modified += 1,
            ChangeAction::Remove => self.removed += 1,
            ChangeAction::Transfer => self.transferred += 1,
        }
    }
}
