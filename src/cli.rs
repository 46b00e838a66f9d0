use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{RawInputs, keys};
use crate::engine::DEFAULT_ENGINE;

#[derive(Parser)]
#[command(name = "snowsync")]
#[command(version)]
#[command(about = "Plan and apply declared warehouse resources from YAML", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Discover resources, plan, and apply (unless dry run)
    Run(RunCommandArgs),

    /// Check configuration and resource files without connecting
    Validate(RunArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Run Inputs
// ============================================================================

/// Every input can come from a flag or its environment key
///
/// Values stay as strings here; validation happens when the run config is built.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Account identifier
    #[arg(long, env = keys::ACCOUNT)]
    pub account: Option<String>,

    /// User to connect as
    #[arg(long, env = keys::USER)]
    pub user: Option<String>,

    /// Password for the user
    #[arg(long, env = keys::PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// Role to assume
    #[arg(long, env = keys::ROLE)]
    pub role: Option<String>,

    /// Warehouse to run under
    #[arg(long, env = keys::WAREHOUSE)]
    pub warehouse: Option<String>,

    /// Checked-out repository root
    #[arg(long, env = keys::WORKSPACE)]
    pub workspace: Option<String>,

    /// Resource directory, relative to the workspace
    #[arg(long, env = keys::RESOURCE_PATH)]
    pub resource_path: Option<String>,

    /// Plan only, never apply: true or false
    #[arg(long, env = keys::DRY_RUN)]
    pub dry_run: Option<String>,

    /// create-or-update or sync
    #[arg(long, env = keys::RUN_MODE)]
    pub run_mode: Option<String>,

    /// Comma-separated resource kinds to manage, or "all"
    #[arg(long, env = keys::RESOURCE_TYPES)]
    pub resource_types: Option<String>,

    /// Let the engine switch roles: true or false
    #[arg(long, env = keys::ALLOW_ROLE_SWITCHING)]
    pub allow_role_switching: Option<String>,

    /// Ignore object ownership when planning: true or false
    #[arg(long, env = keys::IGNORE_OWNERSHIP)]
    pub ignore_ownership: Option<String>,
}

/// `run` takes the shared inputs plus the engine to talk to
#[derive(Args, Debug, Clone)]
pub struct RunCommandArgs {
    #[command(flatten)]
    pub inputs: RunArgs,

    /// Engine program to run
    #[arg(long, env = keys::ENGINE, default_value = DEFAULT_ENGINE)]
    pub engine: PathBuf,
}

impl From<RunArgs> for RawInputs {
    fn from(args: RunArgs) -> Self {
        Self {
            account: args.account,
            user: args.user,
            password: args.password,
            role: args.role,
            warehouse: args.warehouse,
            workspace: args.workspace,
            resource_path: args.resource_path,
            dry_run: args.dry_run,
            run_mode: args.run_mode,
            resource_types: args.resource_types,
            allow_role_switching: args.allow_role_switching,
            ignore_ownership: args.ignore_ownership,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_raw_inputs() {
        let cli = Cli::try_parse_from([
            "snowsync",
            "run",
            "--account",
            "acme",
            "--dry-run",
            "true",
            "--resource-types",
            "role, warehouse",
            "--engine",
            "/opt/engine",
        ])
        .unwrap();

        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.engine, PathBuf::from("/opt/engine"));

        let raw = RawInputs::from(args.inputs);
        assert_eq!(raw.account.as_deref(), Some("acme"));
        assert_eq!(raw.dry_run.as_deref(), Some("true"));
        assert_eq!(raw.resource_types.as_deref(), Some("role, warehouse"));
    }

    #[test]
    fn test_validate_has_no_engine_flag() {
        let result = Cli::try_parse_from(["snowsync", "validate", "--engine", "/opt/engine"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["snowsync", "validate", "-vv", "--no-color"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_color);
        assert!(matches!(cli.command, Command::Validate(_)));
    }
}
