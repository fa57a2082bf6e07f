//! Reporting sink
//!
//! Everything the engine tells the user goes through the [`Ui`] trait so a
//! host tool can substitute its own reporting. [`ConsoleUi`] is the default
//! terminal implementation.

use colored::Colorize;

/// Reporting sink consumed by the engine.
pub trait Ui: Send + Sync {
    /// Progress message.
    fn info(&self, message: &str);
    /// Error report, e.g. a contained fault.
    fn error(&self, message: &str);
}

/// Terminal implementation used by the CLI.
pub struct ConsoleUi;

impl Ui for ConsoleUi {
    fn info(&self, message: &str) {
        println!("{} {}", "→".blue(), message);
    }

    fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }
}
