//! The individual pipeline steps

use super::opener::{open_invocation, Platform};
use super::report::{StepKind, StepOutcome, StepRecord};
use super::Pipeline;
use crate::common::config::DriverSource;
use crate::common::Result;
use crate::process::{Invocation, ProcessStatus};

const GIT: &str = "git";

impl Pipeline<'_> {
    pub(super) async fn run_step(&self, step: StepKind) -> StepRecord {
        let mut actions = Vec::new();
        let result = match step {
            StepKind::Install => self.install(&mut actions).await,
            StepKind::Provision => self.provision(&mut actions).await,
            StepKind::FetchDriver => self.fetch_driver(&mut actions).await,
            StepKind::PatchConfig => self.patch_config(&mut actions).await,
            StepKind::RunTests => self.run_tests(&mut actions).await,
            StepKind::OpenReport => self.open_report(&mut actions).await,
        };

        let outcome = result.unwrap_or_else(|e| StepOutcome::Failed {
            code: None,
            message: e.to_string(),
        });
        StepRecord {
            step,
            outcome,
            actions,
        }
    }

    async fn invoke(&self, actions: &mut Vec<String>, invocation: Invocation) -> Result<StepOutcome> {
        tracing::info!("$ {}", invocation);
        actions.push(invocation.to_string());
        let status: ProcessStatus = self.executor.run(&invocation).await?;
        Ok(StepOutcome::from_status(&invocation.program, status))
    }

    /// Install the dialect into the local repository, tests skipped
    async fn install(&self, actions: &mut Vec<String>) -> Result<StepOutcome> {
        let install = &self.config.install;
        if !install.enabled || self.options.skip_install {
            return Ok(StepOutcome::skipped("install disabled"));
        }

        let invocation = Invocation::new(install.program.as_str(), &self.layout.root)
            .args(install.args.iter().cloned())
            .arg("-f")
            .arg(install.build_file.display().to_string());
        self.invoke(actions, invocation).await
    }

    /// Clone the test repository, or pull when it is already there
    async fn provision(&self, actions: &mut Vec<String>) -> Result<StepOutcome> {
        let repository = &self.config.repository;

        if self.layout.clone_present()? {
            if !repository.update_existing {
                return Ok(StepOutcome::skipped(format!(
                    "{} already exists; clone omitted",
                    self.layout.clone_rel.display()
                )));
            }
            tracing::info!(
                "{} already exists; updating instead of cloning",
                self.layout.clone_rel.display()
            );
            let invocation = Invocation::new(GIT, &self.layout.clone_dir).arg("pull");
            return self.invoke(actions, invocation).await;
        }

        let invocation = Invocation::new(GIT, &self.layout.root)
            .arg("clone")
            .arg(repository.url.as_str())
            .arg(self.layout.clone_rel.display().to_string());
        self.invoke(actions, invocation).await
    }

    /// Fetch the JDBC driver unless it is already on disk
    async fn fetch_driver(&self, actions: &mut Vec<String>) -> Result<StepOutcome> {
        let driver = &self.config.driver;
        if !driver.enabled {
            return Ok(StepOutcome::skipped("driver fetch disabled"));
        }

        let dest = self.layout.in_root(&driver.destination);
        if dest.is_file() {
            return Ok(StepOutcome::skipped(format!(
                "{} already present",
                driver.destination.display()
            )));
        }

        let source = driver.parsed_source()?;
        if let Some(parent) = dest.parent() {
            self.executor.ensure_dir(parent).await?;
        }

        match source {
            DriverSource::CloudStorage(uri) => {
                let invocation = Invocation::new(driver.copy_program.as_str(), &self.layout.root)
                    .arg("cp")
                    .arg(uri)
                    .arg(driver.destination.display().to_string());
                self.invoke(actions, invocation).await
            }
            DriverSource::Http(url) => {
                tracing::info!("Downloading {}", url);
                actions.push(format!("download {} -> {}", url, dest.display()));
                self.executor.download(&url, &dest).await?;
                Ok(StepOutcome::Succeeded)
            }
        }
    }

    /// Copy each configuration fragment over its counterpart in the clone
    async fn patch_config(&self, actions: &mut Vec<String>) -> Result<StepOutcome> {
        if self.config.patches.is_empty() {
            return Ok(StepOutcome::skipped("no configuration fragments"));
        }

        for patch in &self.config.patches {
            let from = self.layout.in_root(&patch.source);
            let to = self.layout.in_clone(&patch.destination);
            tracing::info!(
                "Copying {} to {}",
                patch.source.display(),
                self.layout.clone_rel_path(&patch.destination).display()
            );
            actions.push(format!("cp {} {}", from.display(), to.display()));
            self.executor.copy(&from, &to).await?;
        }
        Ok(StepOutcome::Succeeded)
    }

    /// Run the clone's Gradle wrapper on the configured sub-project
    async fn run_tests(&self, actions: &mut Vec<String>) -> Result<StepOutcome> {
        let tests = &self.config.tests;
        let wrapper = self.layout.gradle_wrapper();
        let project = self.layout.clone_rel_path(&tests.project);

        let invocation = Invocation::new(wrapper.display().to_string(), &self.layout.root)
            .arg(tests.task.as_str())
            .arg("-p")
            .arg(project.display().to_string())
            .arg("--tests")
            .arg(self.filter());
        self.invoke(actions, invocation).await
    }

    /// Open the HTML report in a browser when it was generated
    async fn open_report(&self, actions: &mut Vec<String>) -> Result<StepOutcome> {
        let report = &self.config.report;
        if !report.open || self.options.no_report {
            return Ok(StepOutcome::skipped("report opening disabled"));
        }

        let path = self.layout.in_clone(&report.path);
        if !path.is_file() {
            tracing::warn!("No test report at {}", path.display());
            return Ok(StepOutcome::skipped(format!(
                "no report at {}",
                self.layout.clone_rel_path(&report.path).display()
            )));
        }

        let invocation = open_invocation(
            report.browser.as_deref(),
            Platform::current(),
            &path,
            &self.layout.root,
        );
        self.invoke(actions, invocation).await
    }
}

