//! respec.toml loading and the engine's option set

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;

use crate::framework::RunOptions;
use crate::rules::WatchRule;

/// Engine options, read once at construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Put previously failed targets ahead of newly changed ones.
    pub focus_on_failed: bool,
    /// Full-suite run after a changed-batch pass that retried failures.
    pub all_after_pass: bool,
    /// Full-suite run on startup.
    pub all_on_start: bool,
    /// Retain failed targets across change cycles until they pass.
    pub keep_failed: bool,
    /// Root paths scanned by the full-suite run.
    pub spec_paths: Vec<String>,
    /// Suffix identifying a test file; excludes test files from the
    /// source-reload step.
    pub spec_file_suffix: String,
    /// Glob patterns the inspector drops from every batch.
    pub excluded: Vec<String>,
    /// Options for every run.
    pub run: RunSettings,
    /// Extra options merged only into full-suite runs.
    pub run_all: RunSettings,
    /// Watch-layer hook: touching this file triggers a full-suite run.
    pub monitor_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_on_failed: false,
            all_after_pass: true,
            all_on_start: true,
            keep_failed: true,
            spec_paths: vec!["spec".to_string()],
            spec_file_suffix: "_spec.rb".to_string(),
            excluded: Vec::new(),
            run: RunSettings::default(),
            run_all: RunSettings::default(),
            monitor_file: None,
        }
    }
}

/// Extra framework options for one kind of run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Base options for a changed-batch run.
    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            message: None,
            args: self.run.args.clone(),
            env: self.run.env.clone(),
        }
    }

    /// Overrides applied on top for full-suite runs.
    pub fn run_all_options(&self) -> RunOptions {
        RunOptions {
            message: None,
            args: self.run_all.args.clone(),
            env: self.run_all.env.clone(),
        }
    }
}

/// Top-level respec.toml.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    pub framework: FrameworkSettings,
    #[serde(default)]
    pub rules: Vec<RuleSettings>,
    #[serde(default)]
    pub reloaders: Vec<ReloaderSettings>,
    #[serde(default)]
    pub watch: WatchSettings,
}

/// The test command the engine shells out to.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameworkSettings {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

/// One `[[rules]]` entry: a pattern plus optional expansion templates.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSettings {
    pub pattern: String,
    /// Single expansion template; mutually exclusive with `targets`.
    #[serde(default)]
    pub target: Option<String>,
    /// Multiple expansion templates.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// One `[[reloaders]]` entry: a named shell command run before reruns.
#[derive(Debug, Clone, Deserialize)]
pub struct ReloaderSettings {
    pub name: String,
    pub cmd: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub debounce_ms: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self { debounce_ms: 300 }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse respec.toml")?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.framework.program.is_empty() {
            anyhow::bail!("framework.program must not be empty");
        }

        for rule in &self.rules {
            Regex::new(&rule.pattern)
                .with_context(|| format!("Rule pattern '{}' is not a valid regex", rule.pattern))?;
            if rule.target.is_some() && !rule.targets.is_empty() {
                anyhow::bail!("Rule '{}' sets both 'target' and 'targets'", rule.pattern);
            }
        }

        for reloader in &self.reloaders {
            if reloader.cmd.trim().is_empty() {
                anyhow::bail!("Reloader '{}' has an empty command", reloader.name);
            }
        }

        Ok(())
    }

    /// Compile the configured rules into watch rules.
    pub fn watch_rules(&self) -> Result<Vec<WatchRule>> {
        self.rules.iter().map(|rule| rule.compile()).collect()
    }
}

impl RuleSettings {
    fn compile(&self) -> Result<WatchRule> {
        match (&self.target, self.targets.is_empty()) {
            (Some(target), _) => WatchRule::template(&self.pattern, std::slice::from_ref(target)),
            (None, false) => WatchRule::template(&self.pattern, &self.targets),
            (None, true) => WatchRule::new(&self.pattern),
        }
    }
}
