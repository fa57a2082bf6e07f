//! respec - Watch-driven test rerun engine
//!
//! Turns changed-file events into test runs:
//! - Watch rules map changed paths to test targets
//! - Recently failed targets are retried with every batch until they pass
//! - Faults in the suite are contained and reported, never propagated
//! - Configurable escalation to full-suite runs after a recovery

pub mod config;
pub mod containment;
pub mod failures;
pub mod framework;
pub mod inspector;
pub mod orchestrator;
pub mod reload;
pub mod rules;
pub mod runner;
pub mod ui;
pub mod watcher;

#[cfg(test)]
mod testing;

pub use config::{Config, Settings};
pub use containment::{Containment, CycleFailed, FaultHandler};
pub use failures::FailureSet;
pub use framework::{CommandFramework, RunOptions, TestFramework};
pub use inspector::{FsPresence, Inspector, PathPresence};
pub use orchestrator::Orchestrator;
pub use reload::{Reloader, SourceReload};
pub use rules::{translate, RuleOutput, WatchRule};
pub use runner::Runner;
pub use ui::{ConsoleUi, Ui};
pub use watcher::WatchSession;
