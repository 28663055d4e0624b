//! The transform rule table.
//!
//! Rules map a filename glob pattern to an ordered step chain. Matching is
//! first-registered-wins, and re-registering an identical pattern replaces
//! the prior rule in place, so registration is idempotent. Each rule
//! carries a chain-identity hash over its serialized steps, used as the
//! cache key component that invalidates entries when configuration changes.

use std::path::Path;

use lode_common::{glob_match, ContentHash};
use lode_config::RuleConfig;

use crate::error::TransformError;
use crate::step::TransformStep;

/// An ordered table of transform rules.
#[derive(Debug, Default)]
pub struct TransformRegistry {
    rules: Vec<Rule>,
}

#[derive(Debug)]
struct Rule {
    pattern: String,
    steps: Vec<TransformStep>,
    chain: ContentHash,
}

/// A matched rule's steps and chain identity.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'a> {
    /// The matching pattern, for diagnostics.
    pub pattern: &'a str,
    /// The ordered step chain.
    pub steps: &'a [TransformStep],
    /// Identity hash of the chain.
    pub chain: ContentHash,
}

impl TransformRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the configuration's rule table, preserving
    /// declaration order.
    pub fn from_config(rules: &[RuleConfig]) -> Result<Self, TransformError> {
        let mut registry = Self::new();
        for rule in rules {
            let steps = rule
                .steps
                .iter()
                .map(TransformStep::from_config)
                .collect::<Result<Vec<_>, _>>()?;
            registry.register(&rule.pattern, steps);
        }
        Ok(registry)
    }

    /// Registers a rule.
    ///
    /// If a rule with the identical pattern already exists it is replaced
    /// in place (keeping its match priority); otherwise the rule is
    /// appended with lowest priority.
    pub fn register(&mut self, pattern: &str, steps: Vec<TransformStep>) {
        let chain = chain_identity(&steps);
        let rule = Rule {
            pattern: pattern.to_string(),
            steps,
            chain,
        };
        match self.rules.iter_mut().find(|r| r.pattern == pattern) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    /// Returns the first rule matching the module's filename.
    ///
    /// Fails with [`TransformError::NoMatchingRule`] when no pattern
    /// matches.
    pub fn match_rule(&self, path: &Path) -> Result<MatchedRule<'_>, TransformError> {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        self.rules
            .iter()
            .find(|rule| glob_match(&rule.pattern, file_name))
            .map(|rule| MatchedRule {
                pattern: &rule.pattern,
                steps: &rule.steps,
                chain: rule.chain,
            })
            .ok_or_else(|| TransformError::NoMatchingRule {
                path: path.to_path_buf(),
            })
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Hashes a step chain's serialized form into its identity.
fn chain_identity(steps: &[TransformStep]) -> ContentHash {
    // Serialization failure is impossible for this enum; fall back to an
    // empty serialization rather than panic.
    let encoded = serde_json::to_vec(steps).unwrap_or_default();
    ContentHash::from_bytes(&encoded)
}
