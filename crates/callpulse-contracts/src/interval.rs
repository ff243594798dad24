//! Login session and pause intervals reconstructed from the event log.
//!
//! An interval with `end = None` is open. A `truncated` interval started
//! before the scanned window: its `start` is the window start, not a real
//! event, and must be read as an approximation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{agent::AgentId, event::QueueId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseInterval {
    pub agent_id: AgentId,
    pub queue_id: Option<QueueId>,
    pub reason: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// The opening event precedes the window; `start` is the window start.
    pub truncated: bool,
    /// Closed by a later pause start rather than an explicit unpause.
    pub end_inferred: bool,
}

impl PauseInterval {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length in seconds, measuring open intervals up to `now`.
    pub fn seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.end.unwrap_or(now) - self.start).num_seconds().max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInterval {
    pub agent_id: AgentId,
    pub queue_id: Option<QueueId>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Calls connected to this agent while the session was open.
    pub call_count: u32,
    pub truncated: bool,
    /// Closed by a later login rather than an explicit logout.
    pub end_inferred: bool,
}

impl SessionInterval {
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    pub fn seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.end.unwrap_or(now) - self.start).num_seconds().max(0)
    }
}

/// Every interval reconstructed for one agent, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTimeline {
    pub agent_id: AgentId,
    pub sessions: Vec<SessionInterval>,
    pub pauses: Vec<PauseInterval>,
    /// Boundary inconsistencies that were repaired during the scan
    /// (stale sessions, overlapping pauses, orphan closing events).
    pub recovered: u32,
}

impl AgentTimeline {
    pub fn empty(agent_id: AgentId) -> Self {
        Self {
            agent_id,
            sessions: Vec::new(),
            pauses: Vec::new(),
            recovered: 0,
        }
    }

    /// The most recent session, open or closed.
    pub fn current_session(&self) -> Option<&SessionInterval> {
        self.sessions.last()
    }

    /// The most recent pause, open or closed.
    pub fn current_pause(&self) -> Option<&PauseInterval> {
        self.pauses.last()
    }

    pub fn pause_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.pauses.iter().map(|p| p.seconds(now)).sum()
    }

    pub fn session_seconds(&self, now: DateTime<Utc>) -> i64 {
        self.sessions.iter().map(|s| s.seconds(now)).sum()
    }
}
