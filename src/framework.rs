//! Seam to the underlying test framework
//!
//! The engine only needs a pass/fail signal and a way to keep the
//! framework's ambient configuration from drifting across runs; everything
//! else about the framework stays on the other side of [`TestFramework`].

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};

/// Per-run options handed to the framework.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
    /// Message announced through the UI before the run.
    pub message: Option<String>,
    /// Extra command-line flags for the framework.
    pub args: Vec<String>,
    /// Environment entries applied to the framework's ambient state.
    pub env: HashMap<String, String>,
}

impl RunOptions {
    /// Layer `overrides` on top: args append, env entries and the message
    /// override.
    pub fn merged_with(&self, overrides: &RunOptions) -> RunOptions {
        let mut merged = self.clone();
        merged.args.extend(overrides.args.iter().cloned());
        for (key, value) in &overrides.env {
            merged.env.insert(key.clone(), value.clone());
        }
        if overrides.message.is_some() {
            merged.message = overrides.message.clone();
        }
        merged
    }
}

/// The underlying test framework invocation entry point.
///
/// `run` reports pass/fail only; richer output parsing is out of scope. The
/// snapshot/restore pair is an opaque handle to framework-level ambient
/// state, saved by the executor before a run and restored afterwards so
/// repeated runs do not accumulate global state.
pub trait TestFramework {
    /// Opaque ambient configuration handle.
    type Config;

    fn snapshot(&self) -> Self::Config;
    fn restore(&mut self, config: Self::Config);

    /// Run the given targets. `Err` means the suite could not load or
    /// execute (the caller contains it); `Ok(false)` means it ran and
    /// failed.
    fn run(&mut self, targets: &[String], options: &RunOptions) -> Result<bool>;
}

/// Framework adapter that shells out to a configured test command.
pub struct CommandFramework {
    program: String,
    args: Vec<String>,
    env: HashMap<String, String>,
    cwd: Option<PathBuf>,
}

/// Snapshot of a [`CommandFramework`]'s ambient state.
#[derive(Debug, Clone)]
pub struct CommandConfig {
    args: Vec<String>,
    env: HashMap<String, String>,
}

impl CommandFramework {
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            env: HashMap::new(),
            cwd: None,
        }
    }

    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }
}

impl TestFramework for CommandFramework {
    type Config = CommandConfig;

    fn snapshot(&self) -> CommandConfig {
        CommandConfig {
            args: self.args.clone(),
            env: self.env.clone(),
        }
    }

    fn restore(&mut self, config: CommandConfig) {
        self.args = config.args;
        self.env = config.env;
    }

    fn run(&mut self, targets: &[String], options: &RunOptions) -> Result<bool> {
        // Per-run options land in the ambient state; the executor's
        // snapshot/restore keeps them from sticking across runs.
        self.args.extend(options.args.iter().cloned());
        for (key, value) in &options.env {
            self.env.insert(key.clone(), value.clone());
        }

        let mut command = Command::new(&self.program);
        command.args(&self.args).args(targets).envs(&self.env);
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }

        let status = command
            .status()
            .with_context(|| format!("failed to launch test command `{}`", self.program))?;

        Ok(status.success())
    }
}
