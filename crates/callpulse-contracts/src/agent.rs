//! Agent identity and live status types.
//!
//! `AgentState` is a snapshot, never a history: it is recomputed from the
//! event log on every query and overwritten wholesale.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{CallId, EventKind, QueueId};

/// Agent identifier as it appears in the event log (extension or device).
///
/// Example: AgentId("1001")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an agent is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Available,
    Busy,
    Paused,
    Ringing,
    Offline,
}

impl Status {
    /// Every status, in dashboard display order.
    pub const ALL: [Status; 5] = [
        Status::Available,
        Status::Busy,
        Status::Paused,
        Status::Ringing,
        Status::Offline,
    ];

    /// Human-readable label for wallboards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Busy => "On a call",
            Self::Paused => "Paused",
            Self::Ringing => "Ringing",
            Self::Offline => "Offline",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The event a status was derived from, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastEvent {
    pub sequence: u64,
    pub kind: EventKind,
    pub raw_code: String,
    pub timestamp: DateTime<Utc>,
}

/// The single current snapshot for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub agent_id: AgentId,
    /// Display name from the catalog, filled in by the service.
    pub display_name: Option<String>,
    /// Queue of the event the status was derived from.
    pub queue_id: Option<QueueId>,
    pub status: Status,
    /// Pause reason when paused; a diagnostic when the status came from an
    /// unrecognised code.
    pub status_reason: Option<String>,
    /// When the agent entered `status`. `None` when the agent has no
    /// activity in the scanned window.
    pub since: Option<DateTime<Utc>>,
    pub last_event: Option<LastEvent>,
    /// Call the agent is handling, when busy.
    pub call_id: Option<CallId>,
}

impl AgentState {
    /// The state reported for an agent with no events in the lookback window.
    pub fn offline(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            display_name: None,
            queue_id: None,
            status: Status::Offline,
            status_reason: None,
            since: None,
            last_event: None,
            call_id: None,
        }
    }

    /// Seconds spent in the current status as of `now`.
    pub fn seconds_in_state(&self, now: DateTime<Utc>) -> Option<i64> {
        self.since.map(|since| (now - since).num_seconds().max(0))
    }
}
