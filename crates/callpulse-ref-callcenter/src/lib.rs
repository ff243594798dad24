//! # callpulse-ref-callcenter
//!
//! Call-center reference runtime for the callpulse statistics engine.
//!
//! Demonstrates the engine on a fictional two-queue contact center:
//!
//! 1. **Agent Monitor**: per-agent status, session and pause reconstruction,
//!    including repaired double pauses and an unknown event code.
//! 2. **Service Level**: call totals, SLA, waits and the per-queue board.
//! 3. **Legacy Import**: cached statistics payloads decoded into the same
//!    metrics shape.
//!
//! A `replay` module runs the same queries over a real `queue_log` file.
//!
//! All data is hardcoded and fictional. No external systems are contacted.

pub mod mock_data;
pub mod scenarios;
