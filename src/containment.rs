//! Fault boundary around test runs and reload hooks
//!
//! Anything that can blow up while a suite loads or executes goes through
//! [`Containment::protect`], which converts error returns and panics into
//! the single [`CycleFailed`] abort signal instead of letting them reach the
//! host process.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use thiserror::Error;

use crate::ui::Ui;

/// Abort signal for one failed cycle.
///
/// A run failure, a contained fault during the run, and a reload fault all
/// surface as this one value; the host catches it per cycle. It carries no
/// payload and is never used for any other control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("run cycle failed")]
pub struct CycleFailed;

/// How a contained fault is reported.
pub enum FaultHandler {
    /// Report every cause through the UI sink.
    Report,
    /// Caller-supplied hook; suppresses the default report.
    Custom(Box<dyn Fn(&anyhow::Error) + Send + Sync>),
}

/// Fault boundary shared by the run executor and the reload steps.
#[derive(Clone)]
pub struct Containment {
    ui: Arc<dyn Ui>,
    handler: Arc<FaultHandler>,
}

impl Containment {
    pub fn new(ui: Arc<dyn Ui>, handler: FaultHandler) -> Self {
        Self {
            ui,
            handler: Arc::new(handler),
        }
    }

    /// Run `f`, converting an error return or a panic into [`CycleFailed`].
    pub fn protect<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T, CycleFailed> {
        let fault = match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(error)) => error,
            Err(payload) => anyhow!("panicked: {}", panic_message(payload.as_ref())),
        };

        match self.handler.as_ref() {
            FaultHandler::Report => {
                for cause in fault.chain() {
                    self.ui.error(&cause.to_string());
                }
            }
            FaultHandler::Custom(handler) => handler(&fault),
        }

        Err(CycleFailed)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
