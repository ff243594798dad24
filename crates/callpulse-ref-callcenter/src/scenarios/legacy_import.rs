//! Scenario 3: Legacy Import
//!
//! Cached statistics written by the previous reporting tool are decoded into
//! the same `MetricsWindow` the event log produces, so dashboards can show
//! historic periods that predate the event log.
//!
//!   1. The minimal reference payload (11/11/0) decodes to a full SLA
//!   2. A nested snapshot with one corrupted pair decodes with the bad pair
//!      discarded and counted; everything else survives

use callpulse_contracts::error::{CallpulseError, CallpulseResult};
use callpulse_legacy::decode;

use crate::mock_data::{LEGACY_MINIMAL, LEGACY_SUPPORT_SNAPSHOT};

use super::service_level::print_metrics;

/// Run Scenario 3: Legacy Import.
pub fn run_scenario() -> CallpulseResult<()> {
    println!("=== Scenario 3: Legacy Import ===");
    println!();

    for (label, blob) in [
        ("Minimal payload", LEGACY_MINIMAL),
        ("Support snapshot", LEGACY_SUPPORT_SNAPSHOT),
    ] {
        println!("  {} ({} bytes):", label, blob.len());
        let metrics = decode(blob);
        print_metrics(&metrics);
        println!();
    }

    // Decoded windows serialise exactly like event-log windows.
    let json = serde_json::to_string_pretty(&decode(LEGACY_MINIMAL)).map_err(|e| {
        CallpulseError::MalformedInput {
            reason: format!("failed to serialise decoded metrics: {}", e),
        }
    })?;
    println!("  Minimal payload as JSON:");
    for line in json.lines() {
        println!("    {}", line);
    }

    println!();
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use callpulse_contracts::metrics::MetricsSource;

    use super::*;

    #[test]
    fn test_minimal_payload() {
        let m = decode(LEGACY_MINIMAL);
        assert_eq!(m.source, MetricsSource::LegacyPayload);
        assert_eq!(m.totals.received, 11);
        assert!((m.sla.percentage - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_support_snapshot() {
        let m = decode(LEGACY_SUPPORT_SNAPSHOT);

        assert_eq!(m.totals.received, 42);
        assert_eq!(m.totals.answered, 36);
        assert_eq!(m.totals.abandoned, 5);
        assert_eq!(m.totals.transferred, 3);
        assert_eq!(m.totals.unresolved, 1);
        assert_eq!(m.sla.threshold_secs, 20);
        assert_eq!(m.sla.answered_within, 30);
        assert_eq!(m.sla.percentage, 71.43);

        assert_eq!(m.wait.total_secs, 540);
        assert_eq!(m.wait.avg_secs, Some(15.0));
        // the corrupted MAX_WAIT pair
        assert_eq!(m.wait.max_secs, None);
        assert_eq!(m.discarded_tokens, 1);
        assert_eq!(m.talk.avg_secs, Some(220.0));

        let agents = m.agents.unwrap();
        assert_eq!((agents.logged_in, agents.available, agents.busy, agents.paused), (4, 1, 2, 1));
        let current = m.current.unwrap();
        assert_eq!(current.calls_waiting, 1);
        assert_eq!(current.longest_wait_secs, 12);
    }

    #[test]
    fn test_decoded_json_has_null_unknowns() {
        let json = serde_json::to_value(decode(LEGACY_MINIMAL)).unwrap();
        assert_eq!(json["source"], "legacy_payload");
        assert!(json["wait"]["avg_secs"].is_null());
        assert!(json["agents"].is_null());
    }

    #[test]
    fn test_run_scenario() {
        run_scenario().unwrap();
    }
}
