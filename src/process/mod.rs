//! External process execution
//!
//! Every side effect of the pipeline goes through an [`Executor`]: spawning a
//! tool, downloading the driver, copying a configuration fragment. The real
//! implementation touches the system; the dry-run one only prints.

mod download;
mod dry_run;
mod system;

pub use download::download_file;
pub use dry_run::DryRunExecutor;
pub use system::SystemExecutor;

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::common::Result;

/// One external process to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory of the child
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    /// Shell-like rendering for logs and dry runs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(arg))?;
        }
        Ok(())
    }
}

fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=@+,%".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// How an external process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessStatus {
    /// Exit code; `None` when the process was killed by a signal
    pub code: Option<i32>,
}

impl ProcessStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for ProcessStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Performs the pipeline's side effects
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a process to completion, sharing our terminal
    ///
    /// `Err` means the process could not be started at all.
    async fn run(&self, invocation: &Invocation) -> Result<ProcessStatus>;

    /// Fetch `url` over HTTP(S) into `dest`
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Copy `from` to `to`, overwriting and creating parent directories
    async fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Create `dir` and its parents if missing
    async fn ensure_dir(&self, dir: &Path) -> Result<()>;
}
