//! Offline replay of a real `queue_log` file.
//!
//! Reads the file into an in-memory log, then answers the two wallboard
//! questions over the span the file covers: the state of every agent just
//! after the last record, and the call metrics from first to last record.

use std::path::Path;

use chrono::Duration;
use serde::Serialize;
use tracing::info;

use callpulse_contracts::{
    config::EngineConfig,
    error::{CallpulseError, CallpulseResult},
    metrics::MetricsWindow,
    query::{Deadline, Scope, TimeWindow},
    report::CurrentStateReport,
};
use callpulse_store::{read_queue_log, InMemoryEventLog};

use super::{agent_monitor::hms, build_service, engine_config, service_level::print_metrics};

/// Everything derived from one replayed file.
#[derive(Debug, Serialize)]
pub struct Replay {
    pub accepted: usize,
    pub skipped: u64,
    pub window: TimeWindow,
    pub states: CurrentStateReport,
    pub metrics: MetricsWindow,
}

/// Replay `text` with `config`.
///
/// The window runs from the first record to one second after the last, so
/// the final record is inside it. A file with no readable record is
/// malformed input.
pub fn replay_text(text: &str, config: EngineConfig) -> CallpulseResult<Replay> {
    let import = read_queue_log(text);
    let accepted = import.events.len();

    let first = import.events.iter().map(|e| e.timestamp).min();
    let last = import.events.iter().map(|e| e.timestamp).max();
    let (Some(first), Some(last)) = (first, last) else {
        return Err(CallpulseError::MalformedInput {
            reason: format!("queue_log has no readable records ({} skipped)", import.skipped),
        });
    };
    let now = last + Duration::seconds(1);
    let window = TimeWindow::new(first, now)?;

    let log = InMemoryEventLog::new("replay");
    log.extend(import.events)?;
    let service = build_service(log, config)?;

    let states = service.current_state(&Scope::All, now, &Deadline::none())?;
    let metrics = service.metrics(&window, None, None, &Deadline::none())?;

    info!(accepted, skipped = import.skipped, agents = states.summary.total, "replay complete");

    Ok(Replay {
        accepted,
        skipped: import.skipped,
        window,
        states,
        metrics,
    })
}

/// Replay the file at `path`, optionally with an engine config file, and
/// print the result (as JSON when `json` is set).
pub fn run_file(path: &Path, config: Option<&Path>, json: bool) -> CallpulseResult<()> {
    let text = std::fs::read_to_string(path).map_err(|e| CallpulseError::UpstreamUnavailable {
        source_name: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let config = match config {
        Some(p) => EngineConfig::from_file(p)?,
        None => engine_config()?,
    };

    let replay = replay_text(&text, config)?;

    if json {
        let out = serde_json::to_string_pretty(&replay).map_err(|e| CallpulseError::MalformedInput {
            reason: format!("failed to serialise replay: {}", e),
        })?;
        println!("{}", out);
        return Ok(());
    }

    println!("=== Replay: {} ===", path.display());
    println!();
    println!(
        "  {} record(s) read, {} skipped, {} → {}",
        replay.accepted, replay.skipped, replay.window.start, replay.window.end
    );
    println!();
    for snapshot in &replay.states.agents {
        let state = &snapshot.state;
        println!(
            "  {:<8} {:<16} {:<10} {:>9}  {}",
            state.agent_id,
            state.display_name.as_deref().unwrap_or("?"),
            state.status.label(),
            state
                .seconds_in_state(replay.states.generated_at)
                .map(hms)
                .unwrap_or_else(|| "-".to_string()),
            state.status_reason.as_deref().unwrap_or(""),
        );
    }
    println!();
    print_metrics(&replay.metrics);
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use callpulse_contracts::agent::Status;

    use crate::mock_data::{shift_time, MORNING_QUEUE_LOG};

    use super::*;

    #[test]
    fn test_replay_mock_shift() {
        let replay = replay_text(MORNING_QUEUE_LOG, engine_config().unwrap()).unwrap();

        assert_eq!(replay.accepted, 21);
        assert_eq!(replay.skipped, 1);
        assert_eq!(replay.window.start, shift_time(0));
        // last record is SYSCOMPAT at +1150
        assert_eq!(replay.window.end, shift_time(1151));

        assert_eq!(replay.states.summary.total, 4);
        assert_eq!(replay.states.summary.count(Status::Busy), 2);
        assert_eq!(replay.metrics.totals.received, 6);
        assert_eq!(replay.metrics.totals.answered, 3);
    }

    #[test]
    fn test_replay_without_records() {
        match replay_text("garbage\n\n1|2\n", engine_config().unwrap()) {
            Err(CallpulseError::MalformedInput { reason }) => {
                assert!(reason.contains("2 skipped"));
            }
            other => panic!("expected MalformedInput, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_serialises() {
        let replay = replay_text(MORNING_QUEUE_LOG, engine_config().unwrap()).unwrap();
        let json = serde_json::to_value(&replay).unwrap();
        assert_eq!(json["metrics"]["totals"]["received"], 6);
        assert_eq!(json["states"]["agents"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_missing_file_is_upstream_unavailable() {
        let path = Path::new("/nonexistent/queue_log");
        match run_file(path, None, false) {
            Err(CallpulseError::UpstreamUnavailable { source_name, .. }) => {
                assert!(source_name.contains("queue_log"));
            }
            other => panic!("expected UpstreamUnavailable, got {:?}", other),
        }
    }
}
