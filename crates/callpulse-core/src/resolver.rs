//! Status resolution: the most recent event of an agent → its `AgentState`.
//!
//! A pure table lookup over `EventKind`. Nothing else about the agent's
//! history is consulted; that belongs to the tracker.

use tracing::debug;

use callpulse_contracts::{
    agent::{AgentId, AgentState, LastEvent, Status},
    event::{Event, EventKind},
};

/// Which status table to use for ring events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMapping {
    /// `true`: ring events resolve to `Ringing`. `false`: to `Offline`.
    pub ringing_status: bool,
}

impl Default for StatusMapping {
    fn default() -> Self {
        Self { ringing_status: true }
    }
}

/// Status implied by one event kind.
pub fn status_for(kind: EventKind, mapping: StatusMapping) -> Status {
    match kind {
        EventKind::Connect
        | EventKind::CompleteAgent
        | EventKind::CompleteCaller
        | EventKind::Transfer => Status::Busy,
        EventKind::Pause => Status::Paused,
        EventKind::Unpause | EventKind::Login => Status::Available,
        EventKind::RingNoAnswer | EventKind::RingCanceled => {
            if mapping.ringing_status {
                Status::Ringing
            } else {
                Status::Offline
            }
        }
        EventKind::Logout
        | EventKind::EnterQueue
        | EventKind::Abandon
        | EventKind::ExitWithTimeout
        | EventKind::ExitWithKey
        | EventKind::Unknown => Status::Offline,
    }
}

/// Pick the most recent event by `(timestamp, sequence)`.
pub fn latest_event<'a, I>(events: I) -> Option<&'a Event>
where
    I: IntoIterator<Item = &'a Event>,
{
    events.into_iter().max_by_key(|e| e.order_key())
}

/// Derive the current state of `agent_id` from its most recent event.
///
/// `None` means the agent had no activity in the scanned window and is
/// reported `Offline` with no `since`.
pub fn resolve(agent_id: AgentId, latest: Option<&Event>, mapping: StatusMapping) -> AgentState {
    let Some(event) = latest else {
        return AgentState::offline(agent_id);
    };

    let status = status_for(event.kind, mapping);
    let status_reason = match event.kind {
        EventKind::Pause => event.payload.reason().map(str::to_string),
        EventKind::Unknown => Some(format!("unrecognised event code '{}'", event.raw_code)),
        _ => None,
    };
    let call_id = if status == Status::Busy {
        event.call_id.clone()
    } else {
        None
    };

    debug!(
        agent_id = %agent_id,
        kind = %event.kind,
        raw_code = %event.raw_code,
        status = ?status,
        "resolved agent status"
    );

    AgentState {
        agent_id,
        display_name: None,
        queue_id: event.queue_id.clone(),
        status,
        status_reason,
        since: Some(event.timestamp),
        last_event: Some(LastEvent {
            sequence: event.sequence,
            kind: event.kind,
            raw_code: event.raw_code.clone(),
            timestamp: event.timestamp,
        }),
        call_id,
    }
}
