//! Target inspection before scheduling
//!
//! `clean` is a pure filter: it deduplicates a candidate batch, drops
//! targets matching the excluded patterns, and drops targets whose backing
//! file no longer exists. An empty result means "nothing to do", never an
//! error. The inspector also carries the spec paths a full-suite run scans.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glob::Pattern;

/// File-presence collaborator; lets embedders and tests fake the filesystem.
pub trait PathPresence: Send + Sync {
    fn exists(&self, path: &str) -> bool;
}

/// Real filesystem check.
pub struct FsPresence;

impl PathPresence for FsPresence {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }
}

pub struct Inspector {
    excluded: Vec<Pattern>,
    spec_paths: Vec<String>,
    presence: Arc<dyn PathPresence>,
}

impl Inspector {
    pub fn new(
        excluded: &[String],
        spec_paths: Vec<String>,
        presence: Arc<dyn PathPresence>,
    ) -> Result<Self> {
        let excluded = excluded
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .with_context(|| format!("invalid excluded pattern: {pattern}"))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            excluded,
            spec_paths,
            presence,
        })
    }

    /// Root paths scanned by a full-suite run.
    pub fn spec_paths(&self) -> &[String] {
        &self.spec_paths
    }

    /// Dedup, exclusion, and existence filter, preserving first-seen order.
    pub fn clean(&self, candidates: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|target| seen.insert(target.clone()))
            .filter(|target| !self.is_excluded(target))
            .filter(|target| self.presence.exists(target))
            .collect()
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded.iter().any(|pattern| pattern.matches(target))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::testing::StaticPresence;

    fn batch(targets: &[&str]) -> Vec<String> {
        targets.iter().map(|t| t.to_string()).collect()
    }

    fn inspector(excluded: &[&str], presence: Arc<dyn PathPresence>) -> Inspector {
        let excluded: Vec<String> = excluded.iter().map(|p| p.to_string()).collect();
        Inspector::new(&excluded, vec!["spec".to_string()], presence).unwrap()
    }

    #[test]
    fn test_clean_dedups_preserving_order() {
        let inspector = inspector(&[], StaticPresence::all());

        let cleaned = inspector.clean(batch(&["spec/b", "spec/a", "spec/b"]));

        assert_eq!(cleaned, batch(&["spec/b", "spec/a"]));
    }

    #[test]
    fn test_clean_drops_excluded_targets() {
        let inspector = inspector(&["spec/fixtures/**"], StaticPresence::all());

        let cleaned = inspector.clean(batch(&["spec/a_spec.rb", "spec/fixtures/data_spec.rb"]));

        assert_eq!(cleaned, batch(&["spec/a_spec.rb"]));
    }

    #[test]
    fn test_clean_drops_missing_targets() {
        let inspector = inspector(&[], StaticPresence::of(&["spec/a_spec.rb"]));

        let cleaned = inspector.clean(batch(&["spec/a_spec.rb", "spec/gone_spec.rb"]));

        assert_eq!(cleaned, batch(&["spec/a_spec.rb"]));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let inspector = inspector(&["spec/fixtures/**"], StaticPresence::of(&["spec/a_spec.rb"]));
        let candidates = batch(&["spec/a_spec.rb", "spec/a_spec.rb", "spec/gone_spec.rb"]);

        let once = inspector.clean(candidates);
        let twice = inspector.clean(once.clone());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_batch_is_not_an_error() {
        let inspector = inspector(&[], StaticPresence::of(&[]));

        assert!(inspector.clean(batch(&["spec/gone_spec.rb"])).is_empty());
    }

    #[test]
    fn test_invalid_excluded_pattern_is_rejected() {
        let excluded = vec!["spec/[".to_string()];

        assert!(Inspector::new(&excluded, Vec::new(), StaticPresence::all()).is_err());
    }

    #[test]
    fn test_fs_presence_checks_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("present_spec.rb");
        fs::write(&file, "").unwrap();

        let presence = FsPresence;

        assert!(presence.exists(file.to_str().unwrap()));
        assert!(!presence.exists(dir.path().join("absent_spec.rb").to_str().unwrap()));
    }
}
