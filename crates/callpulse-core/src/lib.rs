//! # callpulse-core
//!
//! The derivation engine for callpulse: turns a classified slice of the
//! event log into agent states, session/pause intervals and windowed call
//! metrics.
//!
//! This crate provides:
//! - The collaborator traits (`EventSource`, `Catalog`, `Classifier`)
//! - Pure derivations: `resolver`, `tracker`, `aggregate`
//! - The `StatsService` that wires them together per query
//!
//! ## Usage
//!
//! ```rust,ignore
//! use callpulse_core::{StatsService, traits::{EventSource, Catalog, Classifier}};
//! ```

pub mod aggregate;
pub mod resolver;
pub mod service;
pub mod tracker;
pub mod traits;

pub use service::StatsService;
