//! Windowed call metrics, correlated by call id.
//!
//! Every call id seen with a call-lifecycle event inside the window is
//! traced independently:
//!
//! - **answered**: any Connect, CompleteAgent, CompleteCaller or Transfer.
//! - **abandoned**: Abandon, ExitWithTimeout or ExitWithKey on a call that
//!   was never answered. `timeout` and `exit_with_key` break it down.
//! - **wait**: first EnterQueue to first Connect. Entries with neither a
//!   connect nor a terminal event stay in `received` but out of the wait
//!   statistics.
//! - **talk**: the switch's reported duration on the completion event,
//!   otherwise completion minus connect.
//!
//! Traces live in ordered maps and events are processed in
//! `(timestamp, sequence)` order, so identical input always serialises to
//! identical output.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use callpulse_contracts::{
    agent::AgentId,
    event::{CallId, Event, EventKind, QueueId},
    metrics::{AgentActivity, Distribution, MetricsSource, MetricsWindow},
    query::TimeWindow,
};

use crate::tracker;

/// Everything observed about one call inside the window.
#[derive(Debug, Default)]
struct CallTrace {
    entered: Option<DateTime<Utc>>,
    connected: Option<DateTime<Utc>>,
    answered: bool,
    transferred: bool,
    exit: Option<EventKind>,
    /// Completion timestamp and the talk time the switch reported, if any.
    completed: Option<(DateTime<Utc>, Option<u64>)>,
}

/// Compute the metrics for `window` from `events`.
///
/// Events outside the window are ignored. A call-lifecycle event without a
/// call id cannot be correlated and is counted in `discarded_tokens`.
pub fn aggregate(events: &[Event], window: &TimeWindow, sla_threshold_secs: u32) -> MetricsWindow {
    let mut in_window: Vec<&Event> = events.iter().filter(|e| window.contains(e.timestamp)).collect();
    in_window.sort_by_key(|e| e.order_key());

    let mut metrics = MetricsWindow::empty(MetricsSource::EventLog, sla_threshold_secs);
    metrics.start = Some(window.start);
    metrics.end = Some(window.end);

    let mut traces: BTreeMap<&CallId, CallTrace> = BTreeMap::new();
    for event in in_window {
        if !event.kind.is_call_lifecycle() {
            continue;
        }
        let Some(call_id) = event.call_id.as_ref() else {
            metrics.discarded_tokens += 1;
            warn!(
                sequence = event.sequence,
                raw_code = %event.raw_code,
                "call event without call id skipped"
            );
            continue;
        };
        let trace = traces.entry(call_id).or_default();
        let ts = event.timestamp;
        match event.kind {
            EventKind::EnterQueue => {
                trace.entered.get_or_insert(ts);
            }
            EventKind::Connect => {
                trace.answered = true;
                trace.connected.get_or_insert(ts);
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller | EventKind::Transfer => {
                trace.answered = true;
                trace.transferred |= event.kind == EventKind::Transfer;
                if trace.completed.is_none() {
                    let reported = event.duration_hint.or_else(|| event.payload.talk_secs());
                    trace.completed = Some((ts, reported));
                }
            }
            EventKind::Abandon | EventKind::ExitWithTimeout | EventKind::ExitWithKey => {
                trace.exit.get_or_insert(event.kind);
            }
            _ => {}
        }
    }

    let threshold = u64::from(sla_threshold_secs);
    let mut waits: Vec<u64> = Vec::new();
    let mut talks: Vec<u64> = Vec::new();

    for trace in traces.values() {
        metrics.totals.received += 1;

        if trace.answered {
            metrics.totals.answered += 1;
            if trace.transferred {
                metrics.totals.transferred += 1;
            }

            match (trace.entered, trace.connected) {
                (Some(entered), Some(connected)) if connected >= entered => {
                    let wait = seconds_between(entered, connected);
                    waits.push(wait);
                    if wait <= threshold {
                        metrics.sla.answered_within += 1;
                    }
                }
                (Some(_), Some(_)) => metrics.correlation.inconsistent_waits += 1,
                _ => metrics.correlation.answered_without_wait += 1,
            }

            if let Some((completed_at, reported)) = trace.completed {
                let talk = reported.or_else(|| {
                    trace
                        .connected
                        .filter(|connected| completed_at >= *connected)
                        .map(|connected| seconds_between(connected, completed_at))
                });
                if let Some(talk) = talk {
                    talks.push(talk);
                }
            }
        } else if let Some(exit) = trace.exit {
            metrics.totals.abandoned += 1;
            match exit {
                EventKind::ExitWithTimeout => metrics.totals.timeout += 1,
                EventKind::ExitWithKey => metrics.totals.exit_with_key += 1,
                _ => {}
            }
        } else {
            metrics.totals.unresolved += 1;
            if trace.entered.is_some() {
                metrics.correlation.uncorrelated_entries += 1;
            }
        }
    }

    metrics.wait = Distribution::from_samples(&waits);
    metrics.talk = Distribution::from_samples(&talks);
    metrics.refresh_rates();

    debug!(
        received = metrics.totals.received,
        answered = metrics.totals.answered,
        abandoned = metrics.totals.abandoned,
        sla = metrics.sla.percentage,
        "aggregated metrics window"
    );

    metrics
}

/// One metrics window per queue seen in `events`.
///
/// Events without a queue id are not attributed to any queue.
pub fn queue_breakdown(
    events: &[Event],
    window: &TimeWindow,
    sla_threshold_secs: u32,
) -> BTreeMap<QueueId, MetricsWindow> {
    let mut by_queue: BTreeMap<&QueueId, Vec<Event>> = BTreeMap::new();
    for event in events {
        if let Some(queue) = event.queue_id.as_ref() {
            by_queue.entry(queue).or_default().push(event.clone());
        }
    }

    by_queue
        .into_iter()
        .map(|(queue, queue_events)| {
            let mut metrics = aggregate(&queue_events, window, sla_threshold_secs);
            metrics.queue_id = Some(queue.clone());
            (queue.clone(), metrics)
        })
        .collect()
}

/// Per-agent activity inside `window`: answered calls, talk time, pauses and
/// rings that went unanswered.
pub fn agent_activity(agent_id: &AgentId, events: &[Event], window: &TimeWindow) -> AgentActivity {
    let mut own: Vec<&Event> = events
        .iter()
        .filter(|e| e.agent_id.as_ref() == Some(agent_id) && window.contains(e.timestamp))
        .collect();
    own.sort_by_key(|e| e.order_key());

    let mut connects: BTreeMap<&CallId, DateTime<Utc>> = BTreeMap::new();
    let mut talks: Vec<u64> = Vec::new();
    let mut calls_answered = 0u64;
    let mut pause_count = 0u64;
    let mut missed_rings = 0u64;

    for event in &own {
        match event.kind {
            EventKind::Connect => {
                calls_answered += 1;
                if let Some(call) = event.call_id.as_ref() {
                    connects.entry(call).or_insert(event.timestamp);
                }
            }
            EventKind::CompleteAgent | EventKind::CompleteCaller | EventKind::Transfer => {
                let reported = event.duration_hint.or_else(|| event.payload.talk_secs());
                let derived = event
                    .call_id
                    .as_ref()
                    .and_then(|call| connects.get(call))
                    .filter(|connected| event.timestamp >= **connected)
                    .map(|connected| seconds_between(*connected, event.timestamp));
                if let Some(talk) = reported.or(derived) {
                    talks.push(talk);
                }
            }
            EventKind::Pause => pause_count += 1,
            EventKind::RingNoAnswer => missed_rings += 1,
            _ => {}
        }
    }

    let owned: Vec<Event> = own.iter().map(|e| (*e).clone()).collect();
    let timeline = tracker::reconstruct(agent_id, &owned, window.start);

    AgentActivity {
        agent_id: agent_id.clone(),
        display_name: None,
        start: window.start,
        end: window.end,
        calls_answered,
        talk: Distribution::from_samples(&talks),
        pause_count,
        pause_secs: timeline.pause_seconds(window.end),
        missed_rings,
        events_seen: own.len() as u64,
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use callpulse_contracts::event::EventPayload;

    use super::*;

    // ── Helpers ──────────────────────────────────────────────────────────────

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn window(from: i64, to: i64) -> TimeWindow {
        TimeWindow::new(at(from), at(to)).unwrap()
    }

    fn call(seq: u64, secs: i64, kind: EventKind, call: &str) -> Event {
        Event {
            sequence: seq,
            agent_id: match kind {
                EventKind::Connect | EventKind::CompleteAgent | EventKind::CompleteCaller => {
                    Some(AgentId::new("1001"))
                }
                _ => None,
            },
            queue_id: Some(QueueId::new("500")),
            call_id: Some(CallId::new(call)),
            kind,
            raw_code: kind.code().to_string(),
            timestamp: at(secs),
            payload: EventPayload::new(),
            duration_hint: None,
        }
    }

    // ── Tests ────────────────────────────────────────────────────────────────

    /// Enter(0), Connect(5), CompleteAgent(65): wait 5, answered once.
    #[test]
    fn answered_call_scenario() {
        let events = vec![
            call(1, 0, EventKind::EnterQueue, "1"),
            call(2, 5, EventKind::Connect, "1"),
            call(3, 65, EventKind::CompleteAgent, "1"),
        ];
        let m = aggregate(&events, &window(-10, 100), 20);

        assert_eq!(m.totals.received, 1);
        assert_eq!(m.totals.answered, 1);
        assert_eq!(m.totals.abandoned, 0);
        assert_eq!(m.wait.samples, 1);
        assert_eq!(m.wait.max_secs, Some(5));
        assert_eq!(m.wait.avg_secs, Some(5.0));
        assert_eq!(m.talk.total_secs, 60);
        assert_eq!(m.sla.answered_within, 1);
        assert_eq!(m.sla.percentage, 100.0);
        assert_eq!(m.rates.answer_rate, 100.0);
    }

    #[test]
    fn empty_window_has_zero_sla_not_nan() {
        let m = aggregate(&[], &window(0, 10), 20);
        assert_eq!(m.totals.received, 0);
        assert_eq!(m.sla.percentage, 0.0);
        assert_eq!(m.rates.answer_rate, 0.0);
        assert_eq!(m.rates.abandon_rate, 0.0);
        assert!(m.wait.avg_secs.is_none());
        assert!(!m.sla.percentage.is_nan());
    }

    #[test]
    fn abandon_counts_only_unanswered_calls() {
        let events = vec![
            call(1, 0, EventKind::EnterQueue, "a"),
            call(2, 30, EventKind::Abandon, "a"),
            call(3, 0, EventKind::EnterQueue, "b"),
            call(4, 90, EventKind::ExitWithTimeout, "b"),
            call(5, 1, EventKind::EnterQueue, "c"),
            call(6, 4, EventKind::ExitWithKey, "c"),
            // Answered then a stray abandon: still answered.
            call(7, 2, EventKind::EnterQueue, "d"),
            call(8, 8, EventKind::Connect, "d"),
            call(9, 9, EventKind::Abandon, "d"),
        ];
        let m = aggregate(&events, &window(-1, 200), 20);
        assert_eq!(m.totals.received, 4);
        assert_eq!(m.totals.answered, 1);
        assert_eq!(m.totals.abandoned, 3);
        assert_eq!(m.totals.timeout, 1);
        assert_eq!(m.totals.exit_with_key, 1);
        assert_eq!(m.rates.abandon_rate, 75.0);
    }

    #[test]
    fn uncorrelated_entry_counts_as_received_only() {
        let events = vec![
            call(1, 0, EventKind::EnterQueue, "waiting"),
            call(2, 0, EventKind::EnterQueue, "x"),
            call(3, 50, EventKind::Connect, "x"),
        ];
        let m = aggregate(&events, &window(-1, 100), 20);
        assert_eq!(m.totals.received, 2);
        assert_eq!(m.totals.unresolved, 1);
        assert_eq!(m.correlation.uncorrelated_entries, 1);
        assert_eq!(m.wait.samples, 1);
        // Answered outside the 20 s threshold.
        assert_eq!(m.sla.answered_within, 0);
        assert_eq!(m.sla.percentage, 0.0);
        assert_eq!(m.rates.answer_rate, 50.0);
    }

    #[test]
    fn answer_without_entry_has_no_wait_sample() {
        let events = vec![
            call(1, 5, EventKind::Connect, "early"),
            call(2, 40, EventKind::CompleteCaller, "early"),
        ];
        let m = aggregate(&events, &window(0, 100), 20);
        assert_eq!(m.totals.answered, 1);
        assert_eq!(m.wait.samples, 0);
        assert_eq!(m.correlation.answered_without_wait, 1);
        assert_eq!(m.talk.total_secs, 35);
    }

    #[test]
    fn reported_talk_time_wins_over_timestamps() {
        let mut complete = call(3, 65, EventKind::CompleteAgent, "1");
        complete.duration_hint = Some(42);
        let events = vec![
            call(1, 0, EventKind::EnterQueue, "1"),
            call(2, 5, EventKind::Connect, "1"),
            complete,
        ];
        let m = aggregate(&events, &window(-1, 100), 20);
        assert_eq!(m.talk.total_secs, 42);
    }

    #[test]
    fn connect_before_entry_is_inconsistent() {
        let events = vec![
            call(1, 10, EventKind::EnterQueue, "skew"),
            call(2, 3, EventKind::Connect, "skew"),
        ];
        let m = aggregate(&events, &window(0, 100), 20);
        assert_eq!(m.correlation.inconsistent_waits, 1);
        assert_eq!(m.wait.samples, 0);
    }

    #[test]
    fn call_event_without_call_id_is_discarded() {
        let mut orphan = call(1, 5, EventKind::EnterQueue, "1");
        orphan.call_id = None;
        let m = aggregate(&[orphan], &window(0, 100), 20);
        assert_eq!(m.totals.received, 0);
        assert_eq!(m.discarded_tokens, 1);
    }

    #[test]
    fn events_outside_window_are_ignored() {
        let events = vec![
            call(1, -50, EventKind::EnterQueue, "old"),
            call(2, 150, EventKind::EnterQueue, "future"),
        ];
        let m = aggregate(&events, &window(0, 100), 20);
        assert_eq!(m.totals.received, 0);
    }

    #[test]
    fn aggregate_is_idempotent_byte_for_byte() {
        let events = vec![
            call(3, 65, EventKind::CompleteAgent, "1"),
            call(1, 0, EventKind::EnterQueue, "1"),
            call(2, 5, EventKind::Connect, "1"),
            call(4, 7, EventKind::EnterQueue, "2"),
            call(5, 19, EventKind::Abandon, "2"),
        ];
        let w = window(-1, 100);
        let first = serde_json::to_vec(&aggregate(&events, &w, 20)).unwrap();
        let second = serde_json::to_vec(&aggregate(&events, &w, 20)).unwrap();
        assert_eq!(first, second);

        // Input order must not matter either.
        let mut reversed = events.clone();
        reversed.reverse();
        let third = serde_json::to_vec(&aggregate(&reversed, &w, 20)).unwrap();
        assert_eq!(first, third);
    }

    #[test]
    fn breakdown_splits_by_queue() {
        let mut sales = call(1, 0, EventKind::EnterQueue, "s1");
        sales.queue_id = Some(QueueId::new("600"));
        let events = vec![
            sales,
            call(2, 0, EventKind::EnterQueue, "1"),
            call(3, 5, EventKind::Connect, "1"),
        ];
        let board = queue_breakdown(&events, &window(-1, 100), 20);
        assert_eq!(board.len(), 2);
        assert_eq!(board[&QueueId::new("500")].totals.answered, 1);
        assert_eq!(board[&QueueId::new("600")].correlation.uncorrelated_entries, 1);
        assert_eq!(board[&QueueId::new("600")].queue_id, Some(QueueId::new("600")));
    }

    #[test]
    fn agent_activity_summarises_calls_and_pauses() {
        let agent = AgentId::new("1001");
        let mut pause = call(10, 100, EventKind::Pause, "-");
        pause.agent_id = Some(agent.clone());
        pause.call_id = None;
        let mut unpause = call(11, 160, EventKind::Unpause, "-");
        unpause.agent_id = Some(agent.clone());
        unpause.call_id = None;
        let mut ring = call(12, 170, EventKind::RingNoAnswer, "2");
        ring.agent_id = Some(agent.clone());

        let events = vec![
            call(1, 0, EventKind::EnterQueue, "1"),
            call(2, 5, EventKind::Connect, "1"),
            call(3, 65, EventKind::CompleteAgent, "1"),
            pause,
            unpause,
            ring,
        ];
        let activity = agent_activity(&agent, &events, &window(0, 300));
        assert_eq!(activity.calls_answered, 1);
        assert_eq!(activity.talk.total_secs, 60);
        assert_eq!(activity.pause_count, 1);
        assert_eq!(activity.pause_secs, 60);
        assert_eq!(activity.missed_rings, 1);
        assert_eq!(activity.events_seen, 5);
    }
}
