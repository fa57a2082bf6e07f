//! Failure tracking across runs

/// Targets that failed their most recent run.
///
/// Insertion-ordered set: merge order decides what the runner sees, so a
/// plain vector with membership checks is used (batches are small).
#[derive(Debug, Default)]
pub struct FailureSet {
    failed: Vec<String>,
}

impl FailureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn contains(&self, target: &str) -> bool {
        self.failed.iter().any(|t| t == target)
    }

    /// Current contents, oldest first.
    pub fn snapshot(&self) -> Vec<String> {
        self.failed.clone()
    }

    /// Fold a run outcome back in: a failing batch is unioned, a passing
    /// batch removes exactly the targets that were re-verified.
    pub fn record(&mut self, batch: &[String], passed: bool) {
        if passed {
            self.failed.retain(|target| !batch.contains(target));
        } else {
            for target in batch {
                if !self.contains(target) {
                    self.failed.push(target.clone());
                }
            }
        }
    }

    /// Union the pending failures into `batch` and clear the set.
    ///
    /// Cleared eagerly so a crash mid-run cannot wedge the tracker in a
    /// stuck state; `record` repopulates it if the run fails. `failed_first`
    /// puts the retried targets ahead of the newly changed ones.
    pub fn merge_with_pending(&mut self, batch: Vec<String>, failed_first: bool) -> Vec<String> {
        let failed = std::mem::take(&mut self.failed);
        let (mut merged, tail) = if failed_first {
            (failed, batch)
        } else {
            (batch, failed)
        };
        for target in tail {
            if !merged.contains(&target) {
                merged.push(target);
            }
        }
        merged
    }

    /// Drop everything; a successful full-suite run re-verified it all.
    pub fn clear(&mut self) {
        self.failed.clear();
    }
}
