//! Configuration file handling
//!
//! Every field has a default, so running without a configuration file drives
//! the stock pipeline: install the dialect, provision `hibernate-orm`, fetch
//! the JDBC driver, patch `databases.gradle`, run the documentation tests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::paths::{user_config_path, LOCAL_CONFIG_FILE};
use super::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory the pipeline runs in; relative paths below resolve against it
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Local dialect install
    #[serde(default)]
    pub install: InstallConfig,

    /// Companion test repository
    #[serde(default)]
    pub repository: RepositoryConfig,

    /// JDBC driver artifact
    #[serde(default)]
    pub driver: DriverConfig,

    /// Configuration fragments copied into the clone
    #[serde(default = "default_patches")]
    pub patches: Vec<PatchConfig>,

    /// Test runner settings
    #[serde(default)]
    pub tests: TestsConfig,

    /// HTML report settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            install: InstallConfig::default(),
            repository: RepositoryConfig::default(),
            driver: DriverConfig::default(),
            patches: default_patches(),
            tests: TestsConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

fn default_workspace() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Build tool invocation that installs the dialect into the local repository
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstallConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Build tool executable
    #[serde(default = "default_install_program")]
    pub program: String,

    /// Arguments placed before `-f <build_file>`
    #[serde(default = "default_install_args")]
    pub args: Vec<String>,

    /// Build descriptor of the dialect project
    #[serde(default = "default_build_file")]
    pub build_file: PathBuf,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_install_program(),
            args: default_install_args(),
            build_file: default_build_file(),
        }
    }
}

fn default_install_program() -> String {
    "mvn".to_string()
}
fn default_install_args() -> Vec<String> {
    vec!["install".to_string(), "-DskipTests".to_string()]
}
fn default_build_file() -> PathBuf {
    PathBuf::from("../pom.xml")
}

/// Remote repository holding the Hibernate ORM test suite
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_repository_url")]
    pub url: String,

    /// Clone directory, relative to the workspace
    #[serde(default = "default_repository_dir")]
    pub directory: PathBuf,

    /// Pull when the clone already exists; when false the clone is left alone
    #[serde(default = "default_true")]
    pub update_existing: bool,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            url: default_repository_url(),
            directory: default_repository_dir(),
            update_existing: true,
        }
    }
}

fn default_repository_url() -> String {
    "https://github.com/hibernate/hibernate-orm.git".to_string()
}
fn default_repository_dir() -> PathBuf {
    PathBuf::from("hibernate-orm")
}

/// JDBC driver artifact fetched once and reused
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DriverConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// `gs://` object or `http(s)://` URL
    #[serde(default = "default_driver_source")]
    pub source: String,

    /// Local path, relative to the workspace
    #[serde(default = "default_driver_destination")]
    pub destination: PathBuf,

    /// Cloud storage client used for `gs://` sources
    #[serde(default = "default_copy_program")]
    pub copy_program: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            source: default_driver_source(),
            destination: default_driver_destination(),
            copy_program: default_copy_program(),
        }
    }
}

/// Where the driver artifact comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverSource {
    /// `gs://` object, copied with the cloud storage client
    CloudStorage(String),
    /// `http://` or `https://` URL, downloaded in-process
    Http(String),
}

impl DriverConfig {
    /// Classify the configured source by scheme
    pub fn parsed_source(&self) -> Result<DriverSource> {
        let source = self.source.trim();
        if source.starts_with("gs://") {
            Ok(DriverSource::CloudStorage(source.to_string()))
        } else if source.starts_with("https://") || source.starts_with("http://") {
            Ok(DriverSource::Http(source.to_string()))
        } else {
            Err(Error::UnsupportedSource(self.source.clone()))
        }
    }
}

fn default_driver_source() -> String {
    "gs://spanner-hibernate-ci/drivers/google-cloud-spanner-jdbc-with-dependencies.jar".to_string()
}
fn default_driver_destination() -> PathBuf {
    PathBuf::from("drivers/google-cloud-spanner-jdbc-with-dependencies.jar")
}
fn default_copy_program() -> String {
    "gsutil".to_string()
}

/// One configuration fragment
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PatchConfig {
    /// Local file, relative to the workspace
    pub source: PathBuf,
    /// Target path, relative to the clone directory
    pub destination: PathBuf,
}

fn default_patches() -> Vec<PatchConfig> {
    vec![PatchConfig {
        source: PathBuf::from("databases.gradle"),
        destination: PathBuf::from("gradle/databases.gradle"),
    }]
}

/// Task runner invocation inside the clone
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestsConfig {
    /// Gradle task to run
    #[serde(default = "default_task")]
    pub task: String,

    /// Sub-project, relative to the clone directory
    #[serde(default = "default_project")]
    pub project: PathBuf,

    /// Filter used when none is given on the command line
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

impl Default for TestsConfig {
    fn default() -> Self {
        Self {
            task: default_task(),
            project: default_project(),
            default_filter: default_filter(),
        }
    }
}

fn default_task() -> String {
    "test".to_string()
}
fn default_project() -> PathBuf {
    PathBuf::from("documentation")
}
fn default_filter() -> String {
    "*".to_string()
}

/// Generated HTML report
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    #[serde(default = "default_true")]
    pub open: bool,

    /// Report file, relative to the clone directory
    #[serde(default = "default_report_path")]
    pub path: PathBuf,

    /// Browser command line; the platform opener is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<Vec<String>>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            open: true,
            path: default_report_path(),
            browser: None,
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("documentation/target/reports/tests/test/index.html")
}

impl Config {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `./hibernate-tests.toml` and
    /// then the per-user config file are tried; defaults apply when neither
    /// exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::ConfigMissing(path.display().to_string()));
            }
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(&local);
        }

        if let Some(path) = user_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| match e {
            Error::Config(message) => Error::ConfigParse {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    /// Parse and validate a TOML document
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<()> {
        if self.repository.directory.as_os_str().is_empty() {
            return Err(Error::Config("repository.directory must not be empty".to_string()));
        }
        if self.install.program.is_empty() {
            return Err(Error::Config("install.program must not be empty".to_string()));
        }
        if self.tests.task.is_empty() {
            return Err(Error::Config("tests.task must not be empty".to_string()));
        }
        if self.driver.enabled {
            self.driver.parsed_source()?;
        }
        if let Some(browser) = &self.report.browser {
            if browser.first().map_or(true, |p| p.is_empty()) {
                return Err(Error::Config(
                    "report.browser needs at least a program name".to_string(),
                ));
            }
        }
        Ok(())
    }
}
