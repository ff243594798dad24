//! Event model: raw records as read from the log and their classified form.
//!
//! The event log is the source of truth. Records are immutable once read;
//! their ordering key is `(timestamp, sequence)` where `sequence` is assigned
//! monotonically at ingestion and breaks timestamp ties.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::AgentId;

/// Identifier of a queue as it appears in the event log (device or name).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QueueId(pub String);

impl QueueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier correlating every event of one inbound call.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallId(pub String);

impl CallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of semantic event kinds.
///
/// Upstream systems emit free-text codes; the classifier maps every code to
/// exactly one of these. `Unknown` means "insufficient information" and is
/// never silently promoted to a real status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    EnterQueue,
    Connect,
    CompleteAgent,
    CompleteCaller,
    Transfer,
    Abandon,
    ExitWithTimeout,
    ExitWithKey,
    Pause,
    Unpause,
    Login,
    Logout,
    RingNoAnswer,
    RingCanceled,
    Unknown,
}

impl EventKind {
    /// Canonical upper-case code, as the telephony system spells it.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EnterQueue => "ENTERQUEUE",
            Self::Connect => "CONNECT",
            Self::CompleteAgent => "COMPLETEAGENT",
            Self::CompleteCaller => "COMPLETECALLER",
            Self::Transfer => "TRANSFER",
            Self::Abandon => "ABANDON",
            Self::ExitWithTimeout => "EXITWITHTIMEOUT",
            Self::ExitWithKey => "EXITWITHKEY",
            Self::Pause => "PAUSE",
            Self::Unpause => "UNPAUSE",
            Self::Login => "ADDMEMBER",
            Self::Logout => "REMOVEMEMBER",
            Self::RingNoAnswer => "RINGNOANSWER",
            Self::RingCanceled => "RINGCANCELED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Kinds that prove an agent picked the call up.
    pub fn is_answer(&self) -> bool {
        matches!(
            self,
            Self::Connect | Self::CompleteAgent | Self::CompleteCaller | Self::Transfer
        )
    }

    /// Kinds that end a call without an agent ever answering.
    pub fn is_unanswered_exit(&self) -> bool {
        matches!(self, Self::Abandon | Self::ExitWithTimeout | Self::ExitWithKey)
    }

    /// Kinds that belong to a call's lifecycle (as opposed to agent state).
    pub fn is_call_lifecycle(&self) -> bool {
        matches!(self, Self::EnterQueue) || self.is_answer() || self.is_unanswered_exit()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Kind-specific event fields, keyed by name.
///
/// Access goes through the named accessors below so the key spelling lives in
/// one place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(BTreeMap<String, String>);

impl EventPayload {
    pub const REASON: &'static str = "reason";
    pub const CALLER_ID: &'static str = "caller_id";
    pub const HOLD_SECS: &'static str = "hold_secs";
    pub const TALK_SECS: &'static str = "talk_secs";
    pub const POSITION: &'static str = "position";

    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert. Empty values are dropped.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if !value.trim().is_empty() {
            self.0.insert(key.to_string(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Pause reason attached to PAUSE events.
    pub fn reason(&self) -> Option<&str> {
        self.get(Self::REASON)
    }

    pub fn caller_id(&self) -> Option<&str> {
        self.get(Self::CALLER_ID)
    }

    /// Seconds the caller held, as reported by the switch on CONNECT.
    pub fn hold_secs(&self) -> Option<u64> {
        self.get(Self::HOLD_SECS).and_then(|v| v.trim().parse().ok())
    }

    /// Seconds of conversation, as reported on completion events.
    pub fn talk_secs(&self) -> Option<u64> {
        self.get(Self::TALK_SECS).and_then(|v| v.trim().parse().ok())
    }
}

/// An unclassified record exactly as the event source returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Ingestion sequence number, strictly increasing per source.
    pub sequence: u64,
    /// Agent identifier text. `None`, empty or `"NONE"` for call-only events.
    pub agent: Option<String>,
    pub queue: Option<String>,
    pub call_id: Option<String>,
    /// Free-text event code, e.g. `"COMPLETEAGENT"`.
    pub code: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub payload: EventPayload,
    /// Duration reported by the switch, in seconds.
    pub duration_hint: Option<u64>,
}

/// A classified event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub sequence: u64,
    pub agent_id: Option<AgentId>,
    pub queue_id: Option<QueueId>,
    pub call_id: Option<CallId>,
    pub kind: EventKind,
    /// Original code text, kept for audit and diagnostics.
    pub raw_code: String,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
    pub duration_hint: Option<u64>,
}

impl Event {
    /// Build a classified event from a raw record and the kind the classifier
    /// chose for it.
    pub fn from_raw(raw: RawEvent, kind: EventKind) -> Self {
        Self {
            sequence: raw.sequence,
            agent_id: normalize_id(raw.agent).map(AgentId),
            queue_id: normalize_id(raw.queue).map(QueueId),
            call_id: normalize_id(raw.call_id).map(CallId),
            kind,
            raw_code: raw.code,
            timestamp: raw.timestamp,
            payload: raw.payload,
            duration_hint: raw.duration_hint,
        }
    }

    /// Total ordering key: timestamp, then ingestion sequence.
    pub fn order_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.sequence)
    }
}

/// Sort events into ascending `(timestamp, sequence)` order.
pub fn sort_events(events: &mut [Event]) {
    events.sort_by_key(Event::order_key);
}

fn normalize_id(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("NONE") {
        None
    } else {
        Some(trimmed.to_string())
    }
}
