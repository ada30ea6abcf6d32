//! Error types for the test harness
//!
//! Failures of the external tools themselves are not errors: they surface as
//! non-zero exit codes in the run report. These variants cover everything
//! that stops the harness from invoking a tool in the first place.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file '{path}': {message}")]
    ConfigParse { path: String, message: String },

    #[error("Configuration file '{0}' does not exist")]
    ConfigMissing(String),

    #[error("Unsupported driver source '{0}'. Use a gs:// or https:// location")]
    UnsupportedSource(String),

    // === Process Errors ===
    #[error("'{program}' not found on PATH. Install it or set its path in the configuration file")]
    ToolNotFound { program: String },

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    // === Transfer Errors ===
    #[error("Download of '{url}' failed: {message}")]
    Download { url: String, message: String },

    #[error("Failed to copy '{}' to '{}': {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

impl Error {
    /// Create a download error from anything displayable
    pub fn download(url: &str, message: impl std::fmt::Display) -> Self {
        Self::Download {
            url: url.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a copy error for a source/destination pair
    pub fn copy(from: &std::path::Path, to: &std::path::Path, source: io::Error) -> Self {
        Self::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }
    }
}
