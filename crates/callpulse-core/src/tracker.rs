//! Session and pause reconstruction.
//!
//! Scans one agent's events in `(timestamp, sequence)` order keeping at most
//! one open session and one open pause:
//!
//! | event   | session                                  | pause                               |
//! |---------|------------------------------------------|-------------------------------------|
//! | Login   | close stale open session, open new       |                                     |
//! | Logout  | close open session                       |                                     |
//! | Pause   |                                          | close open pause, open new          |
//! | Unpause |                                          | close open pause                    |
//! | Connect | `call_count += 1` on the open session    |                                     |
//!
//! A closing event seen before any event of its interval type produces a
//! `truncated` interval starting at the window start. Later orphan closers
//! are dropped. Every repair is counted in `AgentTimeline::recovered` and
//! logged; none of them is an error.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use callpulse_contracts::{
    agent::AgentId,
    event::{Event, EventKind},
    interval::{AgentTimeline, PauseInterval, SessionInterval},
};

/// Rebuild the session and pause history of `agent_id`.
///
/// `events` may arrive in any order and may include other agents' events,
/// which are ignored. `window_start` is the start of the scanned range.
pub fn reconstruct(
    agent_id: &AgentId,
    events: &[Event],
    window_start: DateTime<Utc>,
) -> AgentTimeline {
    let mut ordered: Vec<&Event> = events
        .iter()
        .filter(|e| e.agent_id.as_ref() == Some(agent_id))
        .collect();
    ordered.sort_by_key(|e| e.order_key());

    let mut timeline = AgentTimeline::empty(agent_id.clone());
    let mut open_session: Option<usize> = None;
    let mut open_pause: Option<usize> = None;
    let mut seen_session_boundary = false;
    let mut seen_pause_boundary = false;
    // Connects seen before any session boundary; credited to a truncated
    // session if the first boundary turns out to be a logout.
    let mut calls_before_first_session = 0u32;

    for event in ordered {
        let ts = event.timestamp;
        match event.kind {
            EventKind::Login => {
                if let Some(idx) = open_session.take() {
                    let stale = &mut timeline.sessions[idx];
                    stale.end = Some(ts);
                    stale.end_inferred = true;
                    timeline.recovered += 1;
                    warn!(
                        agent_id = %agent_id,
                        stale_start = %stale.start,
                        closed_at = %ts,
                        "login while a session was open; closed stale session"
                    );
                }
                timeline.sessions.push(SessionInterval {
                    agent_id: agent_id.clone(),
                    queue_id: event.queue_id.clone(),
                    start: ts,
                    end: None,
                    call_count: 0,
                    truncated: false,
                    end_inferred: false,
                });
                open_session = Some(timeline.sessions.len() - 1);
                seen_session_boundary = true;
            }

            EventKind::Logout => {
                if let Some(idx) = open_session.take() {
                    timeline.sessions[idx].end = Some(ts);
                } else if !seen_session_boundary {
                    debug!(
                        agent_id = %agent_id,
                        logout_at = %ts,
                        "logout without in-window login; emitting truncated session"
                    );
                    timeline.sessions.push(SessionInterval {
                        agent_id: agent_id.clone(),
                        queue_id: event.queue_id.clone(),
                        start: window_start.min(ts),
                        end: Some(ts),
                        call_count: calls_before_first_session,
                        truncated: true,
                        end_inferred: false,
                    });
                } else {
                    timeline.recovered += 1;
                    warn!(agent_id = %agent_id, at = %ts, "duplicate logout ignored");
                }
                seen_session_boundary = true;
            }

            EventKind::Pause => {
                if let Some(idx) = open_pause.take() {
                    let prior = &mut timeline.pauses[idx];
                    prior.end = Some(ts);
                    prior.end_inferred = true;
                    timeline.recovered += 1;
                    warn!(
                        agent_id = %agent_id,
                        prior_reason = ?prior.reason,
                        closed_at = %ts,
                        "pause while already paused; closed prior pause"
                    );
                }
                timeline.pauses.push(PauseInterval {
                    agent_id: agent_id.clone(),
                    queue_id: event.queue_id.clone(),
                    reason: event.payload.reason().map(str::to_string),
                    start: ts,
                    end: None,
                    truncated: false,
                    end_inferred: false,
                });
                open_pause = Some(timeline.pauses.len() - 1);
                seen_pause_boundary = true;
            }

            EventKind::Unpause => {
                if let Some(idx) = open_pause.take() {
                    timeline.pauses[idx].end = Some(ts);
                } else if !seen_pause_boundary {
                    debug!(
                        agent_id = %agent_id,
                        unpause_at = %ts,
                        "unpause without in-window pause; emitting truncated pause"
                    );
                    timeline.pauses.push(PauseInterval {
                        agent_id: agent_id.clone(),
                        queue_id: event.queue_id.clone(),
                        reason: None,
                        start: window_start.min(ts),
                        end: Some(ts),
                        truncated: true,
                        end_inferred: false,
                    });
                } else {
                    timeline.recovered += 1;
                    warn!(agent_id = %agent_id, at = %ts, "unpause while not paused ignored");
                }
                seen_pause_boundary = true;
            }

            EventKind::Connect => match open_session {
                Some(idx) => timeline.sessions[idx].call_count += 1,
                None if !seen_session_boundary => calls_before_first_session += 1,
                None => {}
            },

            _ => {}
        }
    }

    timeline
}
