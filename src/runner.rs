//! Run executor
//!
//! One framework invocation behind the fault boundary: announce the run,
//! snapshot the framework's ambient configuration, run, restore the
//! snapshot, report pass/fail. Faults never escape to the caller as
//! anything other than [`CycleFailed`].

use std::sync::Arc;

use crate::containment::{Containment, CycleFailed};
use crate::framework::{RunOptions, TestFramework};
use crate::ui::Ui;

pub struct Runner<F: TestFramework> {
    framework: F,
    containment: Containment,
    ui: Arc<dyn Ui>,
}

impl<F: TestFramework> Runner<F> {
    pub fn new(framework: F, ui: Arc<dyn Ui>, containment: Containment) -> Self {
        Self {
            framework,
            containment,
            ui,
        }
    }

    pub(crate) fn set_containment(&mut self, containment: Containment) {
        self.containment = containment;
    }

    /// The wrapped framework, mainly for inspection.
    pub fn framework(&self) -> &F {
        &self.framework
    }

    /// Run a batch.
    ///
    /// Empty input returns `false` without invoking anything. A fault during
    /// the run is contained and surfaces as [`CycleFailed`]. The framework's
    /// ambient configuration is restored afterwards either way.
    pub fn run(&mut self, targets: &[String], options: &RunOptions) -> Result<bool, CycleFailed> {
        if targets.is_empty() {
            return Ok(false);
        }

        match &options.message {
            Some(message) => self.ui.info(message),
            None => self.ui.info(&format!("Running: {}", targets.join(" "))),
        }

        let saved = self.framework.snapshot();
        let framework = &mut self.framework;
        let outcome = self.containment.protect(|| framework.run(targets, options));
        self.framework.restore(saved);

        outcome
    }
}
