//! In-memory implementation of `EventSource`.
//!
//! `InMemoryEventLog` is the reference event log. It keeps all records in a
//! `Vec` protected by a `Mutex`; clones share the same log, so a writer
//! handle can keep appending while the service reads through another.
//!
//! The log is append-only. `append()` assigns the ingestion sequence number
//! that later breaks timestamp ties.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use callpulse_contracts::{
    error::{CallpulseError, CallpulseResult},
    event::RawEvent,
    query::Deadline,
};
use callpulse_core::traits::{EventFilter, EventSource};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct LogState {
    /// All records written so far, in append order.
    pub(crate) events: Vec<RawEvent>,

    /// The next sequence number to assign (starts at 1).
    pub(crate) next_sequence: u64,
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An in-memory, append-only event log.
#[derive(Clone)]
pub struct InMemoryEventLog {
    name: String,
    pub(crate) state: Arc<Mutex<LogState>>,
}

impl InMemoryEventLog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(LogState {
                events: Vec::new(),
                next_sequence: 1,
            })),
        }
    }

    fn lock(&self) -> CallpulseResult<MutexGuard<'_, LogState>> {
        self.state.lock().map_err(|e| CallpulseError::UpstreamUnavailable {
            source_name: self.name.clone(),
            reason: format!("event log lock poisoned: {}", e),
        })
    }

    /// Append one record, overwriting its `sequence` with the next ingestion
    /// number. Returns the assigned sequence.
    pub fn append(&self, mut event: RawEvent) -> CallpulseResult<u64> {
        let mut state = self.lock()?;
        let sequence = state.next_sequence;
        event.sequence = sequence;
        state.events.push(event);
        state.next_sequence += 1;
        Ok(sequence)
    }

    /// Append every record in order. Returns how many were written.
    pub fn extend(&self, events: impl IntoIterator<Item = RawEvent>) -> CallpulseResult<usize> {
        let mut written = 0;
        for event in events {
            self.append(event)?;
            written += 1;
        }
        info!(log = %self.name, written, "records appended");
        Ok(written)
    }

    pub fn len(&self) -> CallpulseResult<usize> {
        Ok(self.lock()?.events.len())
    }

    pub fn is_empty(&self) -> CallpulseResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Serialise the whole log as JSON, one array of records.
    pub fn export_json(&self) -> CallpulseResult<String> {
        let state = self.lock()?;
        serde_json::to_string_pretty(&state.events).map_err(|e| CallpulseError::MalformedInput {
            reason: format!("failed to serialise event log: {}", e),
        })
    }

    /// Load records exported by `export_json` into a fresh log. Sequence
    /// numbers are reassigned in array order.
    pub fn import_json(name: impl Into<String>, json: &str) -> CallpulseResult<Self> {
        let events: Vec<RawEvent> =
            serde_json::from_str(json).map_err(|e| CallpulseError::MalformedInput {
                reason: format!("invalid event log JSON: {}", e),
            })?;
        let log = Self::new(name);
        log.extend(events)?;
        Ok(log)
    }
}

// ── EventSource impl ──────────────────────────────────────────────────────────

impl EventSource for InMemoryEventLog {
    fn name(&self) -> &str {
        &self.name
    }

    fn events_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        filter: &EventFilter,
        deadline: &Deadline,
    ) -> CallpulseResult<Vec<RawEvent>> {
        deadline.check("event log read")?;
        let state = self.lock()?;

        let selected: Vec<RawEvent> = state
            .events
            .iter()
            .filter(|e| e.timestamp >= from && e.timestamp < until && filter.accepts(e))
            .cloned()
            .collect();

        debug!(
            log = %self.name,
            from = %from,
            until = %until,
            selected = selected.len(),
            total = state.events.len(),
            "event log read"
        );
        Ok(selected)
    }
}
