//! Scenario 1: Agent Monitor
//!
//! The wallboard view: who is logged in, who is on a call, who is paused and
//! for how long. Everything is re-derived from the event log at query time.
//!
//! Walk-through for the demo run:
//!   1. The mock queue_log is parsed (one truncated line is skipped)
//!   2. `current_state(All)` resolves one status per agent from its latest event
//!   3. Sessions and pauses are rebuilt, repairing the double pause of 1002
//!      and the orphan unpause of 1004
//!   4. `agent_activity` summarises each agent's shift

use chrono::{DateTime, Utc};

use callpulse_contracts::{
    error::CallpulseResult,
    metrics::AgentActivity,
    query::{Deadline, Scope, TimeWindow},
    report::{AgentSnapshot, CurrentStateReport},
};
use callpulse_core::StatsService;

use crate::mock_data::{shift_end, shift_start};

use super::morning_service;

/// Current state of every agent at the end of the morning shift.
pub fn wallboard(service: &StatsService) -> CallpulseResult<CurrentStateReport> {
    service.current_state(&Scope::All, shift_end(), &Deadline::none())
}

/// Shift activity of every agent on the wallboard.
pub fn shift_activity(
    service: &StatsService,
    report: &CurrentStateReport,
) -> CallpulseResult<Vec<AgentActivity>> {
    let window = TimeWindow::new(shift_start(), shift_end())?;
    report
        .agents
        .iter()
        .map(|s| service.agent_activity(&s.state.agent_id, &window, &Deadline::none()))
        .collect()
}

// ── Scenario runner ───────────────────────────────────────────────────────────

/// Run Scenario 1: Agent Monitor.
pub fn run_scenario() -> CallpulseResult<()> {
    println!("=== Scenario 1: Agent Monitor ===");
    println!();

    let service = morning_service()?;
    let now = shift_end();
    let report = wallboard(&service)?;

    println!("  Snapshot at {} (lookback from {})", now, report.lookback_start);
    println!("  Query id: {}", report.query_id.0);
    println!();
    println!("  {:<6} {:<12} {:<10} {:>9}  {}", "AGENT", "NAME", "STATUS", "IN STATE", "DETAIL");

    for snapshot in &report.agents {
        print_snapshot(snapshot, now);
    }

    println!();
    let counts: Vec<String> = report
        .summary
        .by_status
        .iter()
        .map(|(status, n)| format!("{} {}", n, status.label()))
        .collect();
    println!("  Summary: {} agent(s): {}", report.summary.total, counts.join(", "));
    println!();

    println!("  Shift activity (08:00–08:30):");
    for activity in shift_activity(&service, &report)? {
        println!(
            "    {:<12} answered {:>2}  talk {:>6}  pauses {:>2} ({:>6})  missed rings {}",
            activity.display_name.as_deref().unwrap_or("?"),
            activity.calls_answered,
            hms(activity.talk.total_secs as i64),
            activity.pause_count,
            hms(activity.pause_secs),
            activity.missed_rings,
        );
    }

    println!();
    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}

fn print_snapshot(snapshot: &AgentSnapshot, now: DateTime<Utc>) {
    let state = &snapshot.state;
    let in_state = state
        .seconds_in_state(now)
        .map(hms)
        .unwrap_or_else(|| "-".to_string());

    let mut detail = Vec::new();
    if let Some(reason) = &state.status_reason {
        detail.push(format!("reason: {}", reason));
    }
    if let Some(call) = &state.call_id {
        detail.push(format!("call {}", call));
    }
    if let Some(session) = snapshot.session.as_ref().filter(|s| s.is_open()) {
        detail.push(format!("session {} ({} call(s))", hms(session.seconds(now)), session.call_count));
    }
    if let Some(pause) = &snapshot.pause {
        let approx = if pause.truncated { "~" } else { "" };
        detail.push(format!("last pause {}{}", approx, hms(pause.seconds(now))));
    }
    if snapshot.recovered > 0 {
        detail.push(format!("{} repair(s)", snapshot.recovered));
    }

    println!(
        "  {:<6} {:<12} {:<10} {:>9}  {}",
        state.agent_id,
        state.display_name.as_deref().unwrap_or("?"),
        state.status.label(),
        in_state,
        detail.join("; "),
    );
}

/// `h:mm:ss`.
pub(crate) fn hms(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
