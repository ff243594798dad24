//! Rule-table classifier implementation.
//!
//! `RuleClassifier` compiles an ordered rule list and implements the
//! `Classifier` trait from callpulse-core.
//!
//! Classification algorithm:
//!
//! 1. Trim the raw code and upper-case it. An empty code is `unknown`.
//! 2. Test rules in declaration order; the first match gives the kind.
//! 3. If no rule matched → `unknown`, logged so new switch codes surface.

use std::path::Path;

use tracing::{debug, warn};

use callpulse_contracts::{
    config::{default_precedence, ClassificationRule, EngineConfig},
    error::{CallpulseError, CallpulseResult},
    event::EventKind,
};
use callpulse_core::traits::Classifier;

use crate::rule::{CompiledRule, RuleTable};

/// A `Classifier` driven by an ordered, first-match-wins rule table.
///
/// ```rust,ignore
/// use callpulse_classify::RuleClassifier;
///
/// let classifier = RuleClassifier::from_config(&engine_config);
/// assert_eq!(classifier.classify("UNPAUSE"), EventKind::Unpause);
/// ```
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: Vec<CompiledRule>,
}

impl RuleClassifier {
    pub fn new(rules: &[ClassificationRule]) -> Self {
        Self {
            rules: rules.iter().map(CompiledRule::compile).collect(),
        }
    }

    /// Use the `precedence` table of an engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.precedence)
    }

    /// Parse a standalone `[[rules]]` TOML document.
    ///
    /// Returns `CallpulseError::ConfigError` if the TOML is malformed, does
    /// not match `RuleTable`, or contains a rule with an empty pattern.
    pub fn from_toml_str(s: &str) -> CallpulseResult<Self> {
        let table: RuleTable = toml::from_str(s).map_err(|e| CallpulseError::ConfigError {
            reason: format!("failed to parse classification TOML: {}", e),
        })?;
        if let Some(rule) = table.rules.iter().find(|r| r.pattern.trim().is_empty()) {
            return Err(CallpulseError::ConfigError {
                reason: format!("classification rule '{}' has an empty pattern", rule.id),
            });
        }
        Ok(Self::new(&table.rules))
    }

    pub fn from_file(path: &Path) -> CallpulseResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CallpulseError::ConfigError {
            reason: format!("failed to read classification file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The id of the rule that would classify `raw_code`, if any.
    pub fn matching_rule(&self, raw_code: &str) -> Option<&str> {
        let code = raw_code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(&code))
            .map(|rule| rule.id.as_str())
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(&default_precedence())
    }
}

impl Classifier for RuleClassifier {
    fn classify(&self, raw_code: &str) -> EventKind {
        let code = raw_code.trim().to_ascii_uppercase();
        if code.is_empty() {
            warn!("empty event code classified as unknown");
            return EventKind::Unknown;
        }

        for rule in &self.rules {
            if rule.matches(&code) {
                debug!(rule_id = %rule.id, raw_code = %raw_code, kind = %rule.kind, "code classified");
                return rule.kind;
            }
        }

        debug!(raw_code = %raw_code, "no classification rule matched; unknown");
        EventKind::Unknown
    }
}
