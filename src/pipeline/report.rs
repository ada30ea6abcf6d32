//! Run report: what each step did and how the run ends

use colored::Colorize;
use serde::Serialize;
use std::fmt;

use crate::process::ProcessStatus;

/// The six pipeline steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepKind {
    Install,
    Provision,
    FetchDriver,
    PatchConfig,
    RunTests,
    OpenReport,
}

impl StepKind {
    pub const ALL: [StepKind; 6] = [
        StepKind::Install,
        StepKind::Provision,
        StepKind::FetchDriver,
        StepKind::PatchConfig,
        StepKind::RunTests,
        StepKind::OpenReport,
    ];

    /// Banner shown when the step starts
    pub fn title(&self) -> &'static str {
        match self {
            StepKind::Install => "Installing dialect",
            StepKind::Provision => "Provisioning test repository",
            StepKind::FetchDriver => "Fetching JDBC driver",
            StepKind::PatchConfig => "Patching configuration",
            StepKind::RunTests => "Running tests",
            StepKind::OpenReport => "Opening report",
        }
    }

    /// Steps that prepare the test run; their failure halts an aborting run
    pub fn is_preparation(&self) -> bool {
        matches!(
            self,
            StepKind::Install | StepKind::Provision | StepKind::FetchDriver | StepKind::PatchConfig
        )
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Install => "install",
            StepKind::Provision => "provision",
            StepKind::FetchDriver => "fetch-driver",
            StepKind::PatchConfig => "patch-config",
            StepKind::RunTests => "run-tests",
            StepKind::OpenReport => "open-report",
        };
        f.write_str(name)
    }
}

/// How a step ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Succeeded,
    Skipped {
        reason: String,
    },
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<i32>,
        message: String,
    },
}

impl StepOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Outcome of a step whose result is a single process status
    pub fn from_status(program: &str, status: ProcessStatus) -> Self {
        if status.success() {
            return Self::Succeeded;
        }
        let message = match status.code {
            Some(code) => format!("{program} exited with code {code}"),
            None => format!("{program} was terminated by a signal"),
        };
        Self::Failed {
            code: status.code,
            message,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    fn failure_code(&self) -> Option<i32> {
        match self {
            Self::Failed { code, .. } => Some(code.filter(|c| *c != 0).unwrap_or(1)),
            _ => None,
        }
    }
}

/// One executed (or skipped) step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: StepKind,
    #[serde(flatten)]
    pub outcome: StepOutcome,
    /// Commands and file operations the step issued, shell-rendered
    pub actions: Vec<String>,
}

/// Whether a failed preparation step stops the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Skip everything after a failed preparation step
    #[default]
    Abort,
    /// Run every step regardless of earlier failures
    KeepGoing,
}

/// Result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub filter: String,
    pub policy: FailurePolicy,
    pub steps: Vec<StepRecord>,
}

impl RunReport {
    pub fn new(filter: String, policy: FailurePolicy) -> Self {
        Self {
            filter,
            policy,
            steps: Vec::new(),
        }
    }

    pub fn record(&self, step: StepKind) -> Option<&StepRecord> {
        self.steps.iter().find(|r| r.step == step)
    }

    /// Process exit code for the run
    ///
    /// The test runner's status when it ran; otherwise the first failed
    /// preparation step's code; otherwise success. The report opener never
    /// affects it.
    pub fn exit_code(&self) -> i32 {
        if let Some(tests) = self.record(StepKind::RunTests) {
            match &tests.outcome {
                StepOutcome::Succeeded => return 0,
                failed @ StepOutcome::Failed { .. } => return failed.failure_code().unwrap_or(1),
                StepOutcome::Skipped { .. } => {}
            }
        }
        self.steps
            .iter()
            .filter(|r| r.step.is_preparation())
            .find_map(|r| r.outcome.failure_code())
            .unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Print a colored per-step summary to stdout
    pub fn print_summary(&self) {
        println!("\n{}", "Summary:".blue().bold());
        for record in &self.steps {
            match &record.outcome {
                StepOutcome::Succeeded => {
                    println!("  {} {}", "✓".green(), record.step);
                }
                StepOutcome::Skipped { reason } => {
                    println!("  {} {} {}", "-".dimmed(), record.step, reason.dimmed());
                }
                StepOutcome::Failed { message, .. } => {
                    println!("  {} {} {}", "✗".red(), record.step, message.red());
                }
            }
        }
        let code = self.exit_code();
        if code == 0 {
            println!("\n{}", "PASSED".green().bold());
        } else {
            println!("\n{} (exit code {})", "FAILED".red().bold(), code);
        }
    }
}
