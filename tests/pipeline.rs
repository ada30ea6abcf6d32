//! Pipeline ordering and branching tests
//!
//! These tests drive the pipeline against a temporary workspace with a
//! recording executor, so no build tool, git or network is needed:
//! 1. The executor logs every process, download and copy in order
//! 2. Process exit codes are scripted per program
//! 3. Existence checks (clone directory, driver, report) use the real disk

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use hibernate_harness::common::config::Config;
use hibernate_harness::process::{Executor, Invocation, ProcessStatus};
use hibernate_harness::{
    Error, FailurePolicy, Pipeline, Result, RunOptions, RunReport, StepKind, StepOutcome,
};
use tempfile::TempDir;

/// A side effect the pipeline asked for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Run(Invocation),
    Download { url: String, dest: PathBuf },
    Copy { from: PathBuf, to: PathBuf },
    EnsureDir(PathBuf),
}

/// Executor that records instead of acting
#[derive(Default)]
struct RecordingExecutor {
    events: Mutex<Vec<Event>>,
    /// Exit code per program file name; unlisted programs succeed
    exit_codes: HashMap<String, i32>,
    /// Programs that cannot be started
    missing: Vec<String>,
}

impl RecordingExecutor {
    fn failing(program: &str, code: i32) -> Self {
        let mut executor = Self::default();
        executor.exit_codes.insert(program.to_string(), code);
        executor
    }

    fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn invocations(&self) -> Vec<Invocation> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Run(inv) => Some(inv),
                _ => None,
            })
            .collect()
    }

    fn position(&self, pred: impl Fn(&Event) -> bool) -> Option<usize> {
        self.events().iter().position(pred)
    }
}

fn program_name(program: &str) -> String {
    Path::new(program)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

#[async_trait]
impl Executor for RecordingExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessStatus> {
        self.events.lock().unwrap().push(Event::Run(invocation.clone()));
        let name = program_name(&invocation.program);
        if self.missing.contains(&name) {
            return Err(Error::ToolNotFound { program: name });
        }
        Ok(ProcessStatus::from_code(
            self.exit_codes.get(&name).copied().unwrap_or(0),
        ))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.events.lock().unwrap().push(Event::Download {
            url: url.to_string(),
            dest: dest.to_path_buf(),
        });
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        self.events.lock().unwrap().push(Event::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(Event::EnsureDir(dir.to_path_buf()));
        Ok(())
    }
}

/// Temporary workspace with a config pointing at it
struct Workspace {
    dir: TempDir,
    config: Config,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.workspace = dir.path().to_path_buf();
        Self { dir, config }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    fn with_clone(self) -> Self {
        std::fs::create_dir_all(self.path("hibernate-orm/gradle")).unwrap();
        self
    }

    fn with_driver(self) -> Self {
        let driver = self.path("drivers/google-cloud-spanner-jdbc-with-dependencies.jar");
        std::fs::create_dir_all(driver.parent().unwrap()).unwrap();
        std::fs::write(driver, b"PK").unwrap();
        self
    }

    fn with_report(self) -> Self {
        let report = self.path("hibernate-orm/documentation/target/reports/tests/test/index.html");
        std::fs::create_dir_all(report.parent().unwrap()).unwrap();
        std::fs::write(report, "<html></html>").unwrap();
        self
    }

    async fn run(&self, executor: &RecordingExecutor, options: RunOptions) -> RunReport {
        Pipeline::new(&self.config, options, executor)
            .expect("Failed to build pipeline")
            .run()
            .await
    }
}

fn is_git(inv: &Invocation, subcommand: &str) -> bool {
    inv.program == "git" && inv.args.first().map(String::as_str) == Some(subcommand)
}

fn gradle_invocation(executor: &RecordingExecutor) -> Invocation {
    executor
        .invocations()
        .into_iter()
        .find(|inv| program_name(&inv.program).starts_with("gradlew"))
        .expect("test runner was not invoked")
}

fn outcome(report: &RunReport, step: StepKind) -> &StepOutcome {
    &report.record(step).expect("step missing from report").outcome
}

// ============== Provisioning ==============

#[tokio::test]
async fn test_absent_clone_is_cloned() {
    let ws = Workspace::new();
    let executor = RecordingExecutor::default();
    ws.run(&executor, RunOptions::default()).await;

    let invocations = executor.invocations();
    let clone = invocations
        .iter()
        .find(|inv| is_git(inv, "clone"))
        .expect("clone was not issued");
    assert_eq!(
        clone.args,
        vec![
            "clone",
            "https://github.com/hibernate/hibernate-orm.git",
            "hibernate-orm"
        ]
    );
    assert_eq!(clone.cwd, ws.dir.path());
    assert!(!invocations.iter().any(|inv| is_git(inv, "pull")));
}

#[tokio::test]
async fn test_existing_clone_is_pulled() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    ws.run(&executor, RunOptions::default()).await;

    let invocations = executor.invocations();
    let pull = invocations
        .iter()
        .find(|inv| is_git(inv, "pull"))
        .expect("pull was not issued");
    assert_eq!(pull.cwd, ws.path("hibernate-orm"));
    assert!(!invocations.iter().any(|inv| is_git(inv, "clone")));
}

#[tokio::test]
async fn test_repeated_runs_never_reclone() {
    let ws = Workspace::new().with_clone();
    for _ in 0..3 {
        let executor = RecordingExecutor::default();
        ws.run(&executor, RunOptions::default()).await;
        assert!(!executor.invocations().iter().any(|inv| is_git(inv, "clone")));
    }
}

#[tokio::test]
async fn test_existing_clone_left_alone_without_updates() {
    let mut ws = Workspace::new().with_clone();
    ws.config.repository.update_existing = false;
    let executor = RecordingExecutor::default();
    let report = ws.run(&executor, RunOptions::default()).await;

    assert!(matches!(
        outcome(&report, StepKind::Provision),
        StepOutcome::Skipped { .. }
    ));
    assert!(!executor.invocations().iter().any(|inv| inv.program == "git"));
}

// ============== Driver fetch ==============

#[tokio::test]
async fn test_missing_driver_is_fetched() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    let report = ws.run(&executor, RunOptions::default()).await;

    let copy = executor
        .invocations()
        .into_iter()
        .find(|inv| inv.program == "gsutil")
        .expect("driver was not fetched");
    assert_eq!(copy.args[0], "cp");
    assert!(copy.args[1].starts_with("gs://"));
    assert_eq!(
        copy.args[2],
        "drivers/google-cloud-spanner-jdbc-with-dependencies.jar"
    );
    assert_eq!(outcome(&report, StepKind::FetchDriver), &StepOutcome::Succeeded);
}

#[tokio::test]
async fn test_driver_directory_prepared_for_both_sources() {
    for source in [
        "gs://ci-bucket/driver.jar",
        "https://storage.googleapis.com/ci/driver.jar",
    ] {
        let mut ws = Workspace::new().with_clone();
        ws.config.driver.source = source.to_string();
        let executor = RecordingExecutor::default();
        ws.run(&executor, RunOptions::default()).await;

        let mkdir = executor
            .position(|e| *e == Event::EnsureDir(ws.path("drivers")))
            .unwrap_or_else(|| panic!("driver directory not prepared for {source}"));
        let fetch = executor
            .position(|e| match e {
                Event::Run(inv) => inv.program == "gsutil",
                Event::Download { .. } => true,
                _ => false,
            })
            .unwrap_or_else(|| panic!("driver not fetched for {source}"));
        assert!(mkdir < fetch);
    }
}

#[tokio::test]
async fn test_present_driver_is_not_fetched() {
    let ws = Workspace::new().with_clone().with_driver();
    let executor = RecordingExecutor::default();
    let report = ws.run(&executor, RunOptions::default()).await;

    assert!(!executor.invocations().iter().any(|inv| inv.program == "gsutil"));
    assert!(!executor
        .events()
        .iter()
        .any(|e| matches!(e, Event::EnsureDir(_))));
    assert!(matches!(
        outcome(&report, StepKind::FetchDriver),
        StepOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn test_https_driver_is_downloaded() {
    let mut ws = Workspace::new().with_clone();
    ws.config.driver.source = "https://storage.googleapis.com/ci/driver.jar".to_string();
    let executor = RecordingExecutor::default();
    ws.run(&executor, RunOptions::default()).await;

    assert!(executor.events().contains(&Event::Download {
        url: "https://storage.googleapis.com/ci/driver.jar".to_string(),
        dest: ws.path("drivers/google-cloud-spanner-jdbc-with-dependencies.jar"),
    }));
    assert!(!executor.invocations().iter().any(|inv| inv.program == "gsutil"));
}

// ============== Ordering and filter ==============

#[tokio::test]
async fn test_steps_run_in_order() {
    let ws = Workspace::new().with_clone().with_report();
    let executor = RecordingExecutor::default();
    let report = ws.run(&executor, RunOptions::default()).await;

    let steps: Vec<StepKind> = report.steps.iter().map(|r| r.step).collect();
    assert_eq!(steps, StepKind::ALL.to_vec());

    let install = executor
        .position(|e| matches!(e, Event::Run(inv) if inv.program == "mvn"))
        .unwrap();
    let pull = executor
        .position(|e| matches!(e, Event::Run(inv) if is_git(inv, "pull")))
        .unwrap();
    let copy = executor
        .position(|e| matches!(e, Event::Copy { .. }))
        .unwrap();
    let tests = executor
        .position(|e| matches!(e, Event::Run(inv) if inv.args.contains(&"--tests".to_string())))
        .unwrap();
    assert!(install < pull);
    assert!(pull < copy);
    assert!(copy < tests);
}

#[tokio::test]
async fn test_install_targets_sibling_build_file() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    ws.run(&executor, RunOptions::default()).await;

    let install = &executor.invocations()[0];
    assert_eq!(install.program, "mvn");
    assert_eq!(install.args, vec!["install", "-DskipTests", "-f", "../pom.xml"]);
    assert_eq!(install.cwd, ws.dir.path());
}

#[tokio::test]
async fn test_fragments_copied_into_clone() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    ws.run(&executor, RunOptions::default()).await;

    assert!(executor.events().contains(&Event::Copy {
        from: ws.path("databases.gradle"),
        to: ws.path("hibernate-orm/gradle/databases.gradle"),
    }));
}

#[tokio::test]
async fn test_default_filter_is_catch_all() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    let report = ws.run(&executor, RunOptions::default()).await;

    let gradle = gradle_invocation(&executor);
    assert_eq!(
        gradle.args,
        vec!["test", "-p", "hibernate-orm/documentation", "--tests", "*"]
    );
    assert_eq!(report.filter, "*");
}

#[tokio::test]
async fn test_filter_passed_verbatim() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    let filter = "org.hibernate.userguide.*Spanner* and spaces";
    let options = RunOptions {
        filter: Some(filter.to_string()),
        ..RunOptions::default()
    };
    ws.run(&executor, options).await;

    let gradle = gradle_invocation(&executor);
    assert_eq!(gradle.args.last().map(String::as_str), Some(filter));
    assert!(gradle.program.ends_with("gradlew") || gradle.program.ends_with("gradlew.bat"));
    assert!(Path::new(&gradle.program).starts_with(ws.path("hibernate-orm")));
}

// ============== Failure policy ==============

#[tokio::test]
async fn test_failed_install_aborts_by_default() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::failing("mvn", 1);
    let report = ws.run(&executor, RunOptions::default()).await;

    assert_eq!(executor.invocations().len(), 1);
    for step in &StepKind::ALL[1..] {
        assert!(matches!(outcome(&report, *step), StepOutcome::Skipped { .. }));
    }
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_keep_going_runs_everything() {
    let ws = Workspace::new();
    let executor = RecordingExecutor::failing("git", 128);
    let options = RunOptions {
        policy: FailurePolicy::KeepGoing,
        ..RunOptions::default()
    };
    let report = ws.run(&executor, options).await;

    assert!(outcome(&report, StepKind::Provision).is_failed());
    gradle_invocation(&executor);
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn test_missing_tool_fails_step() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor {
        missing: vec!["mvn".to_string()],
        ..RecordingExecutor::default()
    };
    let report = ws.run(&executor, RunOptions::default()).await;

    match outcome(&report, StepKind::Install) {
        StepOutcome::Failed { code, message } => {
            assert_eq!(*code, None);
            assert!(message.contains("mvn"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_failed_tests_still_open_report() {
    let ws = Workspace::new().with_clone().with_report();
    let executor = RecordingExecutor::failing("gradlew", 1);
    let report = ws.run(&executor, RunOptions::default()).await;

    assert!(outcome(&report, StepKind::RunTests).is_failed());
    assert_eq!(outcome(&report, StepKind::OpenReport), &StepOutcome::Succeeded);
    let opener = executor.invocations().pop().unwrap();
    assert!(opener
        .args
        .last()
        .unwrap()
        .ends_with("index.html"));
    assert_eq!(report.exit_code(), 1);
}

#[tokio::test]
async fn test_missing_report_is_skipped() {
    let ws = Workspace::new().with_clone();
    let executor = RecordingExecutor::default();
    let report = ws.run(&executor, RunOptions::default()).await;

    assert!(matches!(
        outcome(&report, StepKind::OpenReport),
        StepOutcome::Skipped { .. }
    ));
    assert_eq!(report.exit_code(), 0);
}

// ============== Options ==============

#[tokio::test]
async fn test_skip_install_and_no_report() {
    let ws = Workspace::new().with_clone().with_report();
    let executor = RecordingExecutor::default();
    let options = RunOptions {
        skip_install: true,
        no_report: true,
        ..RunOptions::default()
    };
    let report = ws.run(&executor, options).await;

    assert!(!executor.invocations().iter().any(|inv| inv.program == "mvn"));
    assert!(matches!(
        outcome(&report, StepKind::Install),
        StepOutcome::Skipped { .. }
    ));
    assert!(matches!(
        outcome(&report, StepKind::OpenReport),
        StepOutcome::Skipped { .. }
    ));
}

#[tokio::test]
async fn test_configured_browser_opens_report() {
    let mut ws = Workspace::new().with_clone().with_report();
    ws.config.report.browser = Some(vec!["firefox".to_string()]);
    let executor = RecordingExecutor::default();
    ws.run(&executor, RunOptions::default()).await;

    let opener = executor.invocations().pop().unwrap();
    assert_eq!(opener.program, "firefox");
    assert_eq!(
        PathBuf::from(&opener.args[0]),
        ws.path("hibernate-orm/documentation/target/reports/tests/test/index.html")
    );
}
