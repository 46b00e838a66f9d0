//! `snowsync run` and `snowsync validate`

use anyhow::Result;
use reconcile::{ApplySummary, ResourceDescriptor, RunPolicy};

use crate::Context;
use crate::cli::{RunArgs, RunCommandArgs};
use crate::config::{RawInputs, RunConfig};
use crate::engine::{CommandConnector, CommandEngine, Driver, Reporter, RunOutcome};
use crate::error::Error;
use crate::scanner::{self, PluralKeyExtractor};
use crate::ui;

/// Run the full plan-then-apply sequence
pub fn run(ctx: &Context, args: RunCommandArgs) -> Result<()> {
    let connector = CommandConnector::new(args.engine);
    let mut engine = CommandEngine;
    let mut reporter = ConsoleReporter::new(ctx);
    let raw = RawInputs::from(args.inputs);

    let mut driver = Driver::new(&connector, &mut engine, &mut reporter);
    let outcome = driver.run(&raw);
    debug_assert!(driver.state().is_terminal());
    log::debug!("Run finished in state {}", driver.state());

    match outcome? {
        RunOutcome::DryRun { planned } => {
            log::info!("Dry run planned {} changes", planned);
        }
        RunOutcome::Applied(summary) => {
            log::info!("Applied {} changes", summary.total_changes());
        }
    }
    Ok(())
}

/// Check inputs and resource files; never connects
pub fn validate(ctx: &Context, args: RunArgs) -> Result<()> {
    let mut reporter = ConsoleReporter::new(ctx);
    let raw = RawInputs::from(args);

    let config = RunConfig::from_raw(&raw).map_err(Error::from)?;
    reporter.config(&config);

    let resources =
        scanner::discover(&config.resource_root(), &PluralKeyExtractor).map_err(Error::from)?;
    reporter.resources(&resources);
    reporter.list_resources(&resources, &config.policy);

    ui::success(&format!(
        "Configuration is valid ({})",
        ui::plural(resources.len(), "resource")
    ));
    Ok(())
}

// ============================================================================
// Console Reporter
// ============================================================================

/// Prints run progress to the terminal
///
/// The password never reaches this type: `Credentials` only exposes it on
/// explicit request.
pub struct ConsoleReporter {
    quiet: bool,
    verbose: u8,
}

impl ConsoleReporter {
    pub fn new(ctx: &Context) -> Self {
        Self {
            quiet: ctx.quiet,
            verbose: ctx.verbose,
        }
    }

    /// One line per resource, marking the ones the policy leaves alone
    fn list_resources(&self, resources: &[ResourceDescriptor], policy: &RunPolicy) {
        if self.quiet {
            return;
        }
        for resource in resources {
            let line = format!("{} ({})", resource, resource.source().display());
            if policy.matches(resource) {
                ui::kv(resource.kind().as_str(), &line);
            } else {
                ui::dim(&format!("{} [filtered]", line));
            }
        }
    }
}

impl Reporter for ConsoleReporter {
    fn config(&mut self, config: &RunConfig) {
        if self.quiet {
            return;
        }
        let credentials = &config.credentials;
        let policy = &config.policy;

        ui::header("snowsync");
        ui::kv("account", &credentials.account);
        ui::kv("user", &credentials.user);
        ui::kv("role", &credentials.role);
        ui::kv("warehouse", &credentials.warehouse);
        ui::kv("resources", &config.resource_root().display().to_string());
        ui::kv("run mode", policy.run_mode().as_str());
        ui::kv("dry run", &policy.dry_run().to_string());
        ui::kv("resource types", &resource_types(policy));
        ui::kv("role switching", &policy.allow_role_switching().to_string());
        ui::kv("ignore ownership", &policy.ignore_ownership().to_string());
        println!();
    }

    fn resources(&mut self, resources: &[ResourceDescriptor]) {
        if self.quiet {
            return;
        }
        ui::info(&format!(
            "Discovered {}",
            ui::plural(resources.len(), "resource")
        ));
        if self.verbose > 0 {
            for resource in resources {
                ui::dim(&format!("{} ({})", resource, resource.source().display()));
            }
        }
    }

    fn plan(&mut self, rendered: &str) {
        println!();
        print!("{}", rendered);
        println!();
    }

    fn dry_run(&mut self) {
        ui::warn("Dry run: no changes applied");
    }

    fn applied(&mut self, summary: &ApplySummary) {
        ui::success(&format!(
            "Applied {} ({} created, {} modified, {} removed, {} transferred)",
            ui::plural(summary.total_changes(), "change"),
            summary.created,
            summary.modified,
            summary.removed,
            summary.transferred
        ));
    }
}

fn resource_types(policy: &RunPolicy) -> String {
    if policy.allows_all() {
        return "all".to_string();
    }
    policy
        .resource_type_filter()
        .iter()
        .map(|kind| kind.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
