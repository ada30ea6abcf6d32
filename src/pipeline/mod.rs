//! Test orchestration pipeline
//!
//! Runs six steps strictly in order, each blocking until its external tool
//! exits: install the dialect, clone or update the Hibernate ORM repository,
//! fetch the JDBC driver, copy configuration fragments into the clone, run
//! the clone's tests, open the HTML report.

mod layout;
mod opener;
mod report;
mod steps;

pub use layout::{subdirectories, Layout};
pub use opener::{open_invocation, Platform};
pub use report::{FailurePolicy, RunReport, StepKind, StepOutcome, StepRecord};

use colored::Colorize;

use crate::common::config::Config;
use crate::common::Result;
use crate::process::Executor;

/// Per-run options taken from the command line
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Test filter; the configured default applies when `None`
    pub filter: Option<String>,
    pub policy: FailurePolicy,
    /// Skip the dialect install even if enabled in configuration
    pub skip_install: bool,
    /// Skip opening the report even if enabled in configuration
    pub no_report: bool,
    /// Print a banner as each step starts
    pub announce: bool,
}

/// A configured pipeline bound to an executor
pub struct Pipeline<'a> {
    config: &'a Config,
    options: RunOptions,
    layout: Layout,
    executor: &'a dyn Executor,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, options: RunOptions, executor: &'a dyn Executor) -> Result<Self> {
        let layout = Layout::new(config)?;
        Ok(Self {
            config,
            options,
            layout,
            executor,
        })
    }

    /// The filter handed to the test runner, verbatim
    pub fn filter(&self) -> &str {
        self.options
            .filter
            .as_deref()
            .unwrap_or(&self.config.tests.default_filter)
    }

    /// Run every step and collect the report
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::new(self.filter().to_string(), self.options.policy);
        let mut halted_by: Option<StepKind> = None;

        tracing::info!(
            "Running pipeline in {} (filter: {})",
            self.layout.root.display(),
            self.filter()
        );

        for step in StepKind::ALL {
            if let Some(failed) = halted_by {
                tracing::debug!("Skipping {} after {} failed", step, failed);
                report.steps.push(StepRecord {
                    step,
                    outcome: StepOutcome::skipped(format!("{failed} failed")),
                    actions: Vec::new(),
                });
                continue;
            }

            if self.options.announce {
                println!("\n{} {}", "==>".blue().bold(), step.title().white().bold());
            }

            let record = self.run_step(step).await;
            match &record.outcome {
                StepOutcome::Failed { message, .. } => {
                    tracing::warn!("Step {} failed: {}", step, message);
                    if step.is_preparation() && self.options.policy == FailurePolicy::Abort {
                        halted_by = Some(step);
                    }
                }
                StepOutcome::Skipped { reason } => {
                    tracing::info!("Step {} skipped: {}", step, reason);
                }
                StepOutcome::Succeeded => {}
            }
            report.steps.push(record);
        }

        report
    }
}
