//! Watch rules: changed paths to test targets
//!
//! A [`WatchRule`] pairs a path pattern with an optional transform. Matching
//! rules emit targets in configuration order; a rule without a transform
//! passes the changed path itself through as the target, which treats the
//! changed file as a direct test handle.

use anyhow::{Context, Result};
use regex::{Captures, Regex};

/// What a rule transform produced for one match.
pub enum RuleOutput {
    /// A single target, wrapped into a one-element batch.
    One(String),
    /// A batch of targets, passed through unchanged.
    Many(Vec<String>),
}

impl RuleOutput {
    fn into_targets(self) -> Vec<String> {
        match self {
            RuleOutput::One(target) => vec![target],
            RuleOutput::Many(targets) => targets,
        }
    }
}

impl From<String> for RuleOutput {
    fn from(target: String) -> Self {
        RuleOutput::One(target)
    }
}

impl From<Vec<String>> for RuleOutput {
    fn from(targets: Vec<String>) -> Self {
        RuleOutput::Many(targets)
    }
}

type RuleAction = Box<dyn Fn(&Captures) -> RuleOutput + Send + Sync>;

/// One configured pattern plus optional transform.
pub struct WatchRule {
    pattern: Regex,
    action: Option<RuleAction>,
}

impl WatchRule {
    /// Filter-only rule: a matching changed path becomes the target.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
            action: None,
        })
    }

    /// Rule with a transform over the pattern's capture groups.
    pub fn with_action(
        pattern: &str,
        action: impl Fn(&Captures) -> RuleOutput + Send + Sync + 'static,
    ) -> Result<Self> {
        Ok(Self {
            pattern: compile(pattern)?,
            action: Some(Box::new(action)),
        })
    }

    /// Rule expanding `$1`-style templates, one target per template.
    pub fn template(pattern: &str, templates: &[String]) -> Result<Self> {
        let templates = templates.to_vec();
        Self::with_action(pattern, move |captures| {
            let targets = templates
                .iter()
                .map(|template| {
                    let mut target = String::new();
                    captures.expand(template, &mut target);
                    target
                })
                .collect();
            RuleOutput::Many(targets)
        })
    }

    /// Targets this rule emits for one changed path.
    pub fn targets_for(&self, path: &str) -> Vec<String> {
        match self.pattern.captures(path) {
            None => Vec::new(),
            Some(captures) => match &self.action {
                None => vec![path.to_string()],
                Some(action) => action(&captures).into_targets(),
            },
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid watch pattern: {pattern}"))
}

/// Apply every rule to every changed path; results concatenate in rule
/// order, duplicates included (the inspector dedups later).
pub fn translate(rules: &[WatchRule], paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .flat_map(|path| rules.iter().flat_map(move |rule| rule.targets_for(path)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changed(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_rule_without_action_passes_path_through() {
        let rule = WatchRule::new(r"^spec/(.+)$").unwrap();

        assert_eq!(rule.targets_for("spec/quack_spec"), vec!["spec/quack_spec"]);
    }

    #[test]
    fn test_rule_with_single_target_action() {
        let rule = WatchRule::with_action(r"^spec/(.+)$", |captures| {
            RuleOutput::One(format!("spec/{}_match", &captures[1]))
        })
        .unwrap();

        assert_eq!(rule.targets_for("spec/foo"), vec!["spec/foo_match"]);
    }

    #[test]
    fn test_rule_with_many_targets_action() {
        let rule = WatchRule::with_action(r"^spec/(.+)$", |captures| {
            RuleOutput::Many(vec![
                format!("spec/{}_match", &captures[1]),
                format!("spec/{}_another.rb", &captures[1]),
            ])
        })
        .unwrap();

        assert_eq!(
            rule.targets_for("spec/quack_spec"),
            vec!["spec/quack_spec_match", "spec/quack_spec_another.rb"]
        );
    }

    #[test]
    fn test_non_matching_rule_contributes_nothing() {
        let rule = WatchRule::new(r"^spec/(.+)$").unwrap();

        assert!(rule.targets_for("lib/foo.rb").is_empty());
    }

    #[test]
    fn test_template_rule_expands_captures() {
        let rule =
            WatchRule::template(r"^lib/(.+)\.rb$", &["spec/${1}_spec.rb".to_string()]).unwrap();

        assert_eq!(
            rule.targets_for("lib/myapp/greeter.rb"),
            vec!["spec/myapp/greeter_spec.rb"]
        );
    }

    #[test]
    fn test_translate_concatenates_in_rule_order() {
        let rules = vec![
            WatchRule::template(r"^lib/(.+)\.rb$", &["spec/${1}_spec.rb".to_string()]).unwrap(),
            WatchRule::new(r"^lib/core\.rb$").unwrap(),
        ];

        assert_eq!(
            translate(&rules, &changed(&["lib/core.rb"])),
            vec!["spec/core_spec.rb", "lib/core.rb"]
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(WatchRule::new("(unclosed").is_err());
    }
}
