//! Environment reload hooks
//!
//! Integrations that need refreshing before a rerun (application
//! environment, fixture registries) are injected as [`Reloader`] values by
//! the bootstrap layer. An integration that is not installed simply never
//! shows up here, so "missing" is a silent no-op by construction.

use std::process::Command;

use anyhow::{anyhow, Result};

/// Hook reloading a single changed source file.
pub type SourceReload = Box<dyn FnMut(&str) -> Result<()> + Send>;

type ReloadHook = Box<dyn FnMut() -> Result<()> + Send>;

/// A named environment reload step.
pub struct Reloader {
    name: String,
    hook: ReloadHook,
}

impl Reloader {
    pub fn new(name: &str, hook: impl FnMut() -> Result<()> + Send + 'static) -> Self {
        Self {
            name: name.to_string(),
            hook: Box::new(hook),
        }
    }

    /// Reloader that shells out, failing when the command exits nonzero.
    pub fn command(name: &str, cmd: &str) -> Self {
        let cmd = cmd.to_string();
        let label = name.to_string();
        Reloader::new(name, move || {
            let status = Command::new("sh").arg("-c").arg(&cmd).status()?;
            if status.success() {
                Ok(())
            } else {
                Err(anyhow!("reloader '{label}' exited with {status}"))
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reload(&mut self) -> Result<()> {
        (self.hook)()
    }
}
