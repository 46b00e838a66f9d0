mod cli;
mod commands;
mod config;
mod engine;
mod error;
mod runner;
mod scanner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use std::io;
use std::process;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if cli.no_color {
        ui::disable_color();
    }

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    if let Err(err) = dispatch(&ctx, cli.command) {
        process::exit(report_failure(&err));
    }
}

fn dispatch(ctx: &Context, command: Command) -> Result<()> {
    match command {
        Command::Run(args) => commands::run::run(ctx, args),
        Command::Validate(args) => commands::run::validate(ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "snowsync", &mut io::stdout());
            Ok(())
        }
    }
}

/// Print the final error and pick the exit code
fn report_failure(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<error::Error>() {
        Some(run_error) => {
            let kind = run_error.kind();
            match run_error.subject() {
                Some(subject) => ui::error(&format!(
                    "Run failed ({} at {}): {}",
                    kind.as_str(),
                    subject,
                    run_error
                )),
                None => ui::error(&format!("Run failed ({}): {}", kind.as_str(), run_error)),
            }
            kind.exit_code()
        }
        None => {
            ui::error(&format!("{:#}", err));
            1
        }
    }
}
