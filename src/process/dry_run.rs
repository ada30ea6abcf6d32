//! Executor that only reports what it would do

use async_trait::async_trait;
use colored::Colorize;
use std::path::Path;

use super::{Executor, Invocation, ProcessStatus};
use crate::common::Result;

/// Prints every action and reports success
#[derive(Debug, Default, Clone)]
pub struct DryRunExecutor {
    to_stderr: bool,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print to stderr, keeping stdout for machine-readable output
    pub fn to_stderr() -> Self {
        Self { to_stderr: true }
    }

    fn emit(&self, line: String) {
        if self.to_stderr {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }
}

#[async_trait]
impl Executor for DryRunExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessStatus> {
        self.emit(format!(
            "  {} {}",
            format!("(cd {})", invocation.cwd.display()).dimmed(),
            invocation
        ));
        Ok(ProcessStatus::SUCCESS)
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.emit(format!("  download {} -> {}", url, dest.display()));
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.emit(format!("  cp {} {}", from.display(), to.display()));
        Ok(())
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.is_dir() {
            self.emit(format!("  mkdir -p {}", dir.display()));
        }
        Ok(())
    }
}
