//! Filesystem layout of a run

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::common::config::Config;
use crate::common::paths::absolutize;

/// Absolute locations the pipeline works with
#[derive(Debug, Clone)]
pub struct Layout {
    /// Workspace root; every invocation except `git pull` runs here
    pub root: PathBuf,
    /// Clone directory as configured, relative to the root
    pub clone_rel: PathBuf,
    /// Clone directory, absolute
    pub clone_dir: PathBuf,
}

impl Layout {
    pub fn new(config: &Config) -> io::Result<Self> {
        let root = absolutize(&config.workspace)?;
        let clone_rel = config.repository.directory.clone();
        let clone_dir = root.join(&clone_rel);
        Ok(Self {
            root,
            clone_rel,
            clone_dir,
        })
    }

    /// Resolve a workspace-relative path
    pub fn in_root(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Resolve a clone-relative path
    pub fn in_clone(&self, path: &Path) -> PathBuf {
        self.clone_dir.join(path)
    }

    /// Clone-relative path expressed relative to the root, for arguments
    /// of tools that run in the root
    pub fn clone_rel_path(&self, path: &Path) -> PathBuf {
        self.clone_rel.join(path)
    }

    /// The clone's Gradle wrapper script
    pub fn gradle_wrapper(&self) -> PathBuf {
        if cfg!(windows) {
            self.clone_dir.join("gradlew.bat")
        } else {
            self.clone_dir.join("gradlew")
        }
    }

    /// Whether the clone directory is present
    ///
    /// Decided from the listing of its parent directory, read once.
    pub fn clone_present(&self) -> io::Result<bool> {
        let (parent, name) = match (self.clone_dir.parent(), self.clone_dir.file_name()) {
            (Some(parent), Some(name)) => (parent, name),
            _ => return Ok(self.clone_dir.is_dir()),
        };
        let listing = subdirectories(parent)?;
        Ok(listing.contains(&name.to_string_lossy().into_owned()))
    }
}

/// Names of the subdirectories of `dir`; empty when `dir` does not exist
pub fn subdirectories(dir: &Path) -> io::Result<BTreeSet<String>> {
    if !dir.exists() {
        return Ok(BTreeSet::new());
    }
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir() {
            names.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
