//! # callpulse-store
//!
//! Reference storage for the callpulse engine: an append-only in-memory
//! event log, a static name catalog and a reader for the telephony
//! `queue_log` text format.
//!
//! ## Overview
//!
//! The engine never writes events. These types stand in for the external
//! log during tests, demos and offline replays of a `queue_log` file.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use callpulse_store::{read_queue_log, InMemoryEventLog, StaticCatalog};
//!
//! let import = read_queue_log(&std::fs::read_to_string("queue_log")?);
//! let log = InMemoryEventLog::new("queue_log");
//! log.extend(import.events)?;
//! ```

pub mod catalog;
pub mod memory;
pub mod queue_log;

pub use catalog::{CatalogFile, StaticCatalog};
pub use memory::InMemoryEventLog;
pub use queue_log::{parse_line, read_queue_log, QueueLogImport};

// ── Tests ─────────────────────────────────────────────────────────────────────
