//! Executor backed by the real system

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

use super::{download_file, Executor, Invocation, ProcessStatus};
use crate::common::paths::ensure_parent_dir;
use crate::common::{Error, Result};

/// Spawns tools, downloads and copies for real
#[derive(Debug, Default, Clone)]
pub struct SystemExecutor {
    /// Send child stdout to our stderr
    stdout_to_stderr: bool,
}

impl SystemExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep stdout free for machine-readable output
    pub fn with_stdout_to_stderr() -> Self {
        Self {
            stdout_to_stderr: true,
        }
    }

    fn child_stdout(&self) -> Stdio {
        if self.stdout_to_stderr {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        }
    }
}

/// Resolve a program the way a shell would from `cwd`
///
/// Bare names are searched on PATH; names with a path separator resolve
/// against `cwd`.
fn resolve_program(program: &str, cwd: &Path) -> Result<PathBuf> {
    which::which_in(program, std::env::var_os("PATH"), cwd).map_err(|_| Error::ToolNotFound {
        program: program.to_string(),
    })
}

#[async_trait]
impl Executor for SystemExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessStatus> {
        let program = resolve_program(&invocation.program, &invocation.cwd)?;
        tracing::debug!(
            "Spawning {} in {}",
            program.display(),
            invocation.cwd.display()
        );

        let status = Command::new(&program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::inherit())
            .stdout(self.child_stdout())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| Error::Spawn {
                program: invocation.program.clone(),
                source: e,
            })?;

        tracing::debug!("{} exited with {:?}", invocation.program, status.code());
        Ok(status.into())
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        download_file(url, dest).await
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        ensure_parent_dir(to).map_err(|e| Error::copy(from, to, e))?;
        let bytes = tokio::fs::copy(from, to)
            .await
            .map_err(|e| Error::copy(from, to, e))?;
        tracing::debug!("Copied {} bytes to {}", bytes, to.display());
        Ok(())
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(())
    }
}
