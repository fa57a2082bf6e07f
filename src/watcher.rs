//! File watcher glue for the rerun engine
//!
//! Delivers debounced change events to the orchestrator one cycle at a
//! time, which preserves the engine's single-flow model: no cycle starts
//! before the previous one has run to completion.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use anyhow::Result;
use colored::Colorize;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::containment::CycleFailed;
use crate::framework::TestFramework;
use crate::orchestrator::Orchestrator;

const DEBOUNCE_MS: u128 = 300;
const EXCLUDED_DIRS: &[&str] = &["target", "node_modules", "dist", "out", ".git"];

/// Interactive watch session driving an [`Orchestrator`].
pub struct WatchSession<F: TestFramework> {
    orchestrator: Orchestrator<F>,
    root: PathBuf,
    monitor_file: Option<String>,
    debounce_ms: u128,
}

impl<F: TestFramework> WatchSession<F> {
    pub fn new(orchestrator: Orchestrator<F>, root: &Path) -> Self {
        Self {
            orchestrator,
            root: root.to_path_buf(),
            monitor_file: None,
            debounce_ms: DEBOUNCE_MS,
        }
    }

    /// Watch-layer hook: a touch of this file triggers a full-suite run.
    pub fn with_monitor_file(mut self, monitor_file: Option<String>) -> Self {
        self.monitor_file = monitor_file;
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = u128::from(debounce_ms);
        self
    }

    pub fn start(&mut self) -> Result<()> {
        if self.orchestrator.start().is_err() {
            println!("{} {}", "✗".red().bold(), "Initial run failed".red());
        }

        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = tx.send(event);
                }
            },
            Config::default(),
        )?;

        watcher.watch(&self.root, RecursiveMode::Recursive)?;

        println!(
            "\n{} {} {}\n",
            "👀".cyan(),
            "Watching for changes in".bold(),
            self.root.display()
        );
        println!("{}", "Press Ctrl+C to stop\n".dimmed());

        self.event_loop(rx)
    }

    fn event_loop(&mut self, rx: Receiver<Event>) -> Result<()> {
        let mut last_run = Instant::now() - Duration::from_secs(10);

        while let Ok(event) = rx.recv() {
            // Debounce
            if last_run.elapsed().as_millis() < self.debounce_ms {
                continue;
            }

            let changed: Vec<String> = event
                .paths
                .iter()
                .filter_map(|path| self.relative(path))
                .filter(|path| !is_excluded(path))
                .collect();

            if changed.is_empty() {
                continue;
            }

            last_run = Instant::now();

            if let Some(monitor) = self.monitor_file.clone() {
                if changed.iter().any(|path| *path == monitor) {
                    println!(
                        "\n{} {} {}",
                        "↻".yellow(),
                        "Monitor file touched:".bold(),
                        monitor.dimmed()
                    );
                    self.run_cycle(|orchestrator| orchestrator.run_all());
                    continue;
                }
            }

            println!(
                "\n{} {} {}",
                "↻".yellow(),
                "Files changed:".bold(),
                changed.join(", ").dimmed()
            );
            self.run_cycle(|orchestrator| orchestrator.run_on_change(&changed));
        }

        Ok(())
    }

    fn run_cycle(&mut self, cycle: impl FnOnce(&mut Orchestrator<F>) -> Result<(), CycleFailed>) {
        match cycle(&mut self.orchestrator) {
            Ok(()) => println!("\n{}", "Watching for changes...".dimmed()),
            Err(CycleFailed) => println!(
                "\n{} {}",
                "✗".red().bold(),
                "Cycle failed; watching for changes...".red()
            ),
        }
    }

    fn relative(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.root)
            .ok()
            .map(|rel| rel.to_string_lossy().replace('\\', "/"))
    }
}

fn is_excluded(path: &str) -> bool {
    EXCLUDED_DIRS
        .iter()
        .any(|dir| path.starts_with(&format!("{dir}/")) || path.contains(&format!("/{dir}/")))
}
