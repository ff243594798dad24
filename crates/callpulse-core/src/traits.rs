//! Trait seams between the engine and its collaborators.
//!
//! - `EventSource`: the external append-only event log (read only)
//! - `Catalog`: display names for agents and queues
//! - `Classifier`: raw event code → `EventKind`
//!
//! The engine owns none of these. Storage implementations live in
//! `callpulse-store`, the rule-based classifier in `callpulse-classify`.

use chrono::{DateTime, Utc};

use callpulse_contracts::{
    agent::AgentId,
    error::CallpulseResult,
    event::{EventKind, QueueId, RawEvent},
    query::Deadline,
};

/// Narrows an event-source read to one agent and/or one queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub agent: Option<AgentId>,
    pub queue: Option<QueueId>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn agent(agent: AgentId) -> Self {
        Self { agent: Some(agent), queue: None }
    }

    pub fn queue(queue: QueueId) -> Self {
        Self { agent: None, queue: Some(queue) }
    }

    /// True when a raw record passes this filter.
    pub fn accepts(&self, event: &RawEvent) -> bool {
        let agent_ok = match &self.agent {
            Some(agent) => event.agent.as_deref().map(str::trim) == Some(agent.0.as_str()),
            None => true,
        };
        let queue_ok = match &self.queue {
            Some(queue) => event.queue.as_deref().map(str::trim) == Some(queue.0.as_str()),
            None => true,
        };
        agent_ok && queue_ok
    }
}

/// Read access to the event log.
///
/// Implementations must honour `deadline` on slow reads and report failures
/// as `CallpulseError::UpstreamUnavailable`, never as an empty result.
pub trait EventSource: Send + Sync {
    /// Name used in logs and `UpstreamUnavailable` errors.
    fn name(&self) -> &str;

    /// All records with `from <= timestamp < until` that pass `filter`, in
    /// any order. Covers both "events since T" and "events for agent A in
    /// [T1, T2]".
    fn events_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        filter: &EventFilter,
        deadline: &Deadline,
    ) -> CallpulseResult<Vec<RawEvent>>;
}

/// Read-only display-name lookups. Misses return `Ok(None)`.
pub trait Catalog: Send + Sync {
    fn agent_name(&self, agent: &AgentId) -> CallpulseResult<Option<String>>;

    fn queue_name(&self, queue: &QueueId) -> CallpulseResult<Option<String>>;
}

/// Maps a free-text event code to the closed `EventKind` set.
///
/// Must be deterministic and free of I/O.
pub trait Classifier: Send + Sync {
    fn classify(&self, raw_code: &str) -> EventKind;
}
