//! Shared test doubles for the engine's collaborator seams.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use crate::framework::{RunOptions, TestFramework};
use crate::inspector::PathPresence;
use crate::ui::Ui;

/// Ui double recording every message.
#[derive(Default)]
pub struct RecordingUi {
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn error_count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl Ui for RecordingUi {
    fn info(&self, message: &str) {
        self.infos.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Presence double backed by an explicit path set, or permissive.
pub struct StaticPresence {
    everything: bool,
    present: HashSet<String>,
}

impl StaticPresence {
    /// Every path exists.
    pub fn all() -> Arc<Self> {
        Arc::new(Self {
            everything: true,
            present: HashSet::new(),
        })
    }

    /// Only the listed paths exist.
    pub fn of(paths: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            everything: false,
            present: paths.iter().map(|p| p.to_string()).collect(),
        })
    }
}

impl PathPresence for StaticPresence {
    fn exists(&self, path: &str) -> bool {
        self.everything || self.present.contains(path)
    }
}

/// Outcome script entry for [`FakeFramework`].
pub enum Scripted {
    Pass,
    Fail,
    Fault(&'static str),
    Panic(&'static str),
}

/// Framework double that records every invocation and follows a script.
/// Runs past the end of the script pass. Each run pushes a marker into the
/// ambient state so snapshot/restore behavior is observable.
#[derive(Default)]
pub struct FakeFramework {
    script: VecDeque<Scripted>,
    pub runs: Vec<(Vec<String>, RunOptions)>,
    pub ambient: Vec<String>,
}

impl FakeFramework {
    pub fn scripted(script: Vec<Scripted>) -> Self {
        Self {
            script: script.into(),
            runs: Vec::new(),
            ambient: Vec::new(),
        }
    }

    /// Target batches seen so far, in invocation order.
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.runs.iter().map(|(targets, _)| targets.clone()).collect()
    }
}

impl TestFramework for FakeFramework {
    type Config = Vec<String>;

    fn snapshot(&self) -> Vec<String> {
        self.ambient.clone()
    }

    fn restore(&mut self, config: Vec<String>) {
        self.ambient = config;
    }

    fn run(&mut self, targets: &[String], options: &RunOptions) -> anyhow::Result<bool> {
        self.runs.push((targets.to_vec(), options.clone()));
        self.ambient.push(format!("run #{}", self.runs.len()));
        match self.script.pop_front() {
            None | Some(Scripted::Pass) => Ok(true),
            Some(Scripted::Fail) => Ok(false),
            Some(Scripted::Fault(message)) => Err(anyhow!(message)),
            Some(Scripted::Panic(message)) => panic!("{message}"),
        }
    }
}
