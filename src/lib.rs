//! Hibernate ORM integration test harness
//!
//! Drives the external tools needed to run the Hibernate ORM test suite
//! against a locally built SQL dialect: the build tool, git, the cloud
//! storage client, the Gradle wrapper of the test repository and a browser.

pub mod cli;
pub mod commands;
pub mod common;
pub mod pipeline;
pub mod process;

// Re-export commonly used types for tests
pub use common::{Error, Result};
pub use pipeline::{FailurePolicy, Pipeline, RunOptions, RunReport, StepKind, StepOutcome};
