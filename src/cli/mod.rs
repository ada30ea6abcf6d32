//! CLI command handling
//!
//! Builds the pipeline from configuration and flags, runs it, and turns the
//! report into output and an exit code.

use std::path::Path;

use colored::Colorize;

use crate::commands::{Commands, RunArgs};
use crate::common::config::Config;
use crate::common::Result;
use crate::pipeline::{FailurePolicy, Pipeline, RunOptions};
use crate::process::{DryRunExecutor, Executor, SystemExecutor};

/// Dispatch a subcommand, returning the process exit code
pub async fn dispatch(command: Commands, config_path: Option<&Path>) -> Result<i32> {
    let config = Config::load(config_path)?;

    match command {
        Commands::Plan {
            filter,
            skip_install,
        } => {
            let options = RunOptions {
                filter,
                policy: FailurePolicy::KeepGoing,
                skip_install,
                no_report: false,
                announce: true,
            };
            let executor = DryRunExecutor::new();
            let pipeline = Pipeline::new(&config, options, &executor)?;
            pipeline.run().await;
            Ok(0)
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(0)
        }
    }
}

/// Run the pipeline, returning the process exit code
pub async fn run(args: RunArgs, config_path: Option<&Path>) -> Result<i32> {
    let config = Config::load(config_path)?;

    let options = RunOptions {
        filter: args.filter,
        policy: if args.keep_going {
            FailurePolicy::KeepGoing
        } else {
            FailurePolicy::Abort
        },
        skip_install: args.skip_install,
        no_report: args.no_report,
        announce: !args.json,
    };

    // In JSON mode stdout carries only the report
    let (system, dry_run) = if args.json {
        (
            SystemExecutor::with_stdout_to_stderr(),
            DryRunExecutor::to_stderr(),
        )
    } else {
        (SystemExecutor::new(), DryRunExecutor::new())
    };
    let executor: &dyn Executor = if args.dry_run { &dry_run } else { &system };

    let pipeline = Pipeline::new(&config, options, executor)?;
    let report = pipeline.run().await;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_summary();
        let preparation_failed = report
            .steps
            .iter()
            .any(|r| r.step.is_preparation() && r.outcome.is_failed());
        if preparation_failed && !args.keep_going {
            println!(
                "{}",
                "Re-run with --keep-going to continue past failed preparation steps.".dimmed()
            );
        }
    }

    Ok(report.exit_code())
}
