//! Top-level rerun engine
//!
//! Decides, for each batch of changed paths, what to run and what to do
//! with the outcome: translate paths through the watch rules, merge in
//! pending failures, clean the batch, reload what needs reloading, run, and
//! either escalate to a full-suite run or abort the cycle.

use std::sync::Arc;

use anyhow::Result;

use crate::config::Settings;
use crate::containment::{Containment, CycleFailed, FaultHandler};
use crate::failures::FailureSet;
use crate::framework::TestFramework;
use crate::inspector::{FsPresence, Inspector, PathPresence};
use crate::reload::{Reloader, SourceReload};
use crate::rules::{translate, WatchRule};
use crate::runner::Runner;
use crate::ui::{ConsoleUi, Ui};

const RUN_ALL_MESSAGE: &str = "Running all specs";

pub struct Orchestrator<F: TestFramework> {
    settings: Settings,
    rules: Vec<WatchRule>,
    inspector: Inspector,
    failures: FailureSet,
    runner: Runner<F>,
    reloaders: Vec<Reloader>,
    source_reload: Option<SourceReload>,
    presence: Arc<dyn PathPresence>,
    containment: Containment,
    ui: Arc<dyn Ui>,
}

impl<F: TestFramework> Orchestrator<F> {
    /// Engine with console reporting and real filesystem checks.
    pub fn new(rules: Vec<WatchRule>, settings: Settings, framework: F) -> Result<Self> {
        Self::with_collaborators(
            rules,
            settings,
            framework,
            Arc::new(ConsoleUi),
            Arc::new(FsPresence),
        )
    }

    /// Engine with explicit collaborators, for embedders and tests.
    pub fn with_collaborators(
        rules: Vec<WatchRule>,
        settings: Settings,
        framework: F,
        ui: Arc<dyn Ui>,
        presence: Arc<dyn PathPresence>,
    ) -> Result<Self> {
        let inspector = Inspector::new(
            &settings.excluded,
            settings.spec_paths.clone(),
            presence.clone(),
        )?;
        let containment = Containment::new(ui.clone(), FaultHandler::Report);
        let runner = Runner::new(framework, ui.clone(), containment.clone());

        Ok(Self {
            settings,
            rules,
            inspector,
            failures: FailureSet::new(),
            runner,
            reloaders: Vec::new(),
            source_reload: None,
            presence,
            containment,
            ui,
        })
    }

    /// Replace the fault handler used by the run boundary and reload steps.
    pub fn with_fault_handler(mut self, handler: FaultHandler) -> Self {
        let containment = Containment::new(self.ui.clone(), handler);
        self.runner.set_containment(containment.clone());
        self.containment = containment;
        self
    }

    /// Register an environment reload hook run before changed reruns.
    pub fn add_reloader(&mut self, reloader: Reloader) {
        self.reloaders.push(reloader);
    }

    /// Install the hook reloading changed non-test source files.
    pub fn set_source_reload(&mut self, hook: SourceReload) {
        self.source_reload = Some(hook);
    }

    /// The wrapped framework, mainly for inspection.
    pub fn framework(&self) -> &F {
        self.runner.framework()
    }

    /// Pending failed targets, oldest first.
    pub fn failed_targets(&self) -> Vec<String> {
        self.failures.snapshot()
    }

    /// Startup entry point: full suite if `all_on_start` is set.
    pub fn start(&mut self) -> Result<(), CycleFailed> {
        if self.settings.all_on_start {
            self.run_all()
        } else {
            Ok(())
        }
    }

    /// Run every configured spec path with the run-all overrides merged on
    /// top of the base options. Success re-verifies everything, so the
    /// failure set is cleared entirely.
    pub fn run_all(&mut self) -> Result<(), CycleFailed> {
        let paths = self.inspector.spec_paths().to_vec();
        let mut options = self
            .settings
            .run_options()
            .merged_with(&self.settings.run_all_options());
        options.message = Some(RUN_ALL_MESSAGE.to_string());

        let passed = self.runner.run(&paths, &options)?;
        if !passed {
            return Err(CycleFailed);
        }

        self.failures.clear();
        Ok(())
    }

    /// One change cycle: translate, merge pending failures, clean, reload,
    /// run, record, decide the follow-up.
    pub fn run_on_change(&mut self, paths: &[String]) -> Result<(), CycleFailed> {
        if paths.is_empty() {
            return Ok(());
        }

        let translated = translate(&self.rules, paths);
        let previously_failed = self.failures.snapshot();
        let merged = if self.settings.keep_failed {
            self.failures
                .merge_with_pending(translated, self.settings.focus_on_failed)
        } else {
            translated
        };
        let batch = self.inspector.clean(merged);
        if batch.is_empty() {
            return Ok(());
        }

        self.reload_paths(paths)?;
        self.run_reloaders()?;

        let options = self.settings.run_options();
        let passed = match self.runner.run(&batch, &options) {
            Ok(passed) => passed,
            Err(fault) => {
                // A contained fault counts as a failed run for tracking.
                self.failures.record(&batch, false);
                return Err(fault);
            }
        };

        self.failures.record(&batch, passed);
        if !passed {
            return Err(CycleFailed);
        }

        let retried_failures = batch
            .iter()
            .any(|target| previously_failed.contains(target));
        if retried_failures && self.settings.all_after_pass {
            self.run_all()?;
        }

        Ok(())
    }

    /// Reload changed non-test source files through the configured hook.
    ///
    /// Test files (per `spec_file_suffix`) and paths that no longer exist
    /// are skipped; no hook configured means no-op. A hook fault aborts the
    /// cycle.
    pub fn reload_paths(&mut self, paths: &[String]) -> Result<(), CycleFailed> {
        let Some(hook) = self.source_reload.as_mut() else {
            return Ok(());
        };

        for path in paths {
            if path.ends_with(&self.settings.spec_file_suffix) || !self.presence.exists(path) {
                continue;
            }
            self.containment.protect(|| hook(path))?;
        }

        Ok(())
    }

    /// Run each configured environment reloader behind the fault boundary.
    /// The first fault aborts; the remaining reloaders do not run.
    pub fn run_reloaders(&mut self) -> Result<(), CycleFailed> {
        for reloader in &mut self.reloaders {
            self.containment.protect(|| reloader.reload())?;
        }
        Ok(())
    }
}
