//! CLI command definitions
//!
//! Defines the clap arguments and subcommands for the harness.

use clap::error::ErrorKind;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "hibernate-harness",
    about = "Run Hibernate ORM integration tests against the local dialect"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub run: RunArgs,

    /// Configuration file (default: ./hibernate-tests.toml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    /// Reject run flags given alongside a subcommand
    ///
    /// clap accepts them at the top level before any subcommand, where they
    /// would be silently ignored.
    pub fn validate(&self) -> Result<(), clap::Error> {
        if let Some(command) = &self.command {
            if self.run != RunArgs::default() {
                return Err(Cli::command().error(
                    ErrorKind::ArgumentConflict,
                    format!(
                        "run options cannot be used with the '{}' subcommand",
                        command.name()
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Print the commands a run would issue without running them
    Plan {
        /// Test name or pattern passed to `gradlew --tests`
        filter: Option<String>,

        /// Leave the dialect install out of the plan
        #[arg(long)]
        skip_install: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Plan { .. } => "plan",
            Commands::Config => "config",
        }
    }
}

/// Arguments of the default run
#[derive(Args, Debug, Default, PartialEq, Eq)]
pub struct RunArgs {
    /// Test name or pattern passed to `gradlew --tests` (default: all tests).
    /// Use `-- plan` to filter on a test named like a subcommand
    pub filter: Option<String>,

    /// Keep running later steps after a failed install, clone, fetch or patch
    #[arg(long)]
    pub keep_going: bool,

    /// Print each command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Do not open the HTML report afterwards
    #[arg(long)]
    pub no_report: bool,

    /// Do not install the dialect before testing
    #[arg(long)]
    pub skip_install: bool,

    /// Print the run summary as JSON; tool output goes to stderr
    #[arg(long)]
    pub json: bool,
}
