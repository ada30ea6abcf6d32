//! Configuration and workspace paths

use std::io;
use std::path::{Component, Path, PathBuf};

/// Name used for the per-user config directory
const APP_NAME: &str = "hibernate-harness";

/// Config file looked up in the current directory before the user config dir
pub const LOCAL_CONFIG_FILE: &str = "hibernate-tests.toml";

/// Get the configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/hibernate-harness/`
/// - macOS: `~/Library/Application Support/hibernate-harness/`
/// - Windows: `%APPDATA%\hibernate-harness\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the per-user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Make `path` absolute against the current directory without touching the disk
///
/// The clone directory may not exist yet, so `canonicalize` is not an option.
/// `.` components are dropped; `..` is kept.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(joined
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect())
}

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
