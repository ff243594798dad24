//! # callpulse-classify
//!
//! An ordered, first-match-wins classifier that maps free-text telephony
//! event codes to the closed `EventKind` set.
//!
//! ## Overview
//!
//! This crate provides [`RuleClassifier`], which implements the
//! [`Classifier`](callpulse_core::traits::Classifier) trait. Rules are taken
//! from the engine configuration or a standalone TOML file, tested in order,
//! and the first match wins. Unmatched codes are `unknown`.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use callpulse_classify::RuleClassifier;
//!
//! let classifier = RuleClassifier::from_config(&config);
//! // Pass `classifier` to `callpulse_core::StatsService::new(...)`.
//! ```
//!
//! ## Rule matching
//!
//! A rule matches when its `pattern` occurs anywhere in the upper-cased code
//! and that occurrence is not part of one of the rule's `unless` tokens.
//! The default table lists busy codes before pause codes, so a code naming
//! both (`PAUSE_CONNECT`) is busy.

pub mod engine;
pub mod rule;

pub use engine::RuleClassifier;
pub use rule::RuleTable;

// ── Tests ─────────────────────────────────────────────────────────────────────
