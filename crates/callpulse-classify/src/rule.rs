//! Classification rule tables.
//!
//! A `RuleTable` is deserialized from TOML and holds an ordered list of
//! `ClassificationRule`s. Rules are evaluated in declaration order; the first
//! rule whose pattern occurs in the event code wins. If no rule matches, the
//! code classifies as `unknown`.

use serde::{Deserialize, Serialize};

use callpulse_contracts::{config::ClassificationRule, event::EventKind};

/// The top-level structure of a standalone classification file.
///
/// Example:
/// ```toml
/// [[rules]]
/// id = "pause"
/// pattern = "PAUSE"
/// kind = "pause"
/// unless = ["UNPAUSE"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTable {
    /// Ordered list of rules. First match wins.
    pub rules: Vec<ClassificationRule>,
}

/// A rule normalised for matching: every token upper-cased once at load.
#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub id: String,
    pub kind: EventKind,
    pattern: String,
    unless: Vec<String>,
}

impl CompiledRule {
    pub fn compile(rule: &ClassificationRule) -> Self {
        Self {
            id: rule.id.clone(),
            kind: rule.kind,
            pattern: rule.pattern.trim().to_ascii_uppercase(),
            unless: rule
                .unless
                .iter()
                .map(|t| t.trim().to_ascii_uppercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    /// True when `code` (already upper-cased) contains the pattern outside
    /// every `unless` token.
    ///
    /// `unless` occurrences are blanked out before the containment test, so
    /// `PAUSE unless UNPAUSE` rejects `UNPAUSE` but still accepts
    /// `UNPAUSE_PAUSE`.
    pub fn matches(&self, code: &str) -> bool {
        if self.pattern.is_empty() {
            return false;
        }
        if self.unless.is_empty() {
            return code.contains(&self.pattern);
        }
        let mut scrubbed = code.to_string();
        for token in &self.unless {
            scrubbed = scrubbed.replace(token.as_str(), " ");
        }
        scrubbed.contains(&self.pattern)
    }
}
