//! # callpulse-legacy
//!
//! Decoder for the length-prefixed statistics payloads written by older
//! queue reporting tools.
//!
//! This crate provides [`decode`], which turns a payload into the same
//! [`MetricsWindow`](callpulse_contracts::metrics::MetricsWindow) the event
//! aggregator produces, in two phases:
//!
//! 1. **Tokenise**: `parser::unserialize` extracts flattened key/value
//!    pairs with `nom`, discarding and counting anything malformed.
//! 2. **Map**: `decoder::from_pairs` reads the known counter keys.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use callpulse_legacy::decode;
//!
//! let metrics = decode(r#"a:1:{s:14:"TOTAL_RECEIVED";i:11;}"#);
//! assert_eq!(metrics.totals.received, 11);
//! ```

pub mod decoder;
pub mod parser;

pub use decoder::{decode, from_pairs};
pub use parser::{encode, unserialize, LegacyValue, Unserialized};
