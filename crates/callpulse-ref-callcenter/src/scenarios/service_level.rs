//! Scenario 2: Service Level
//!
//! Supervisor view of the morning shift: how many calls came in, how many
//! were answered inside the SLA threshold, how long callers waited, and a
//! per-queue board combining traffic with live agent head-counts.

use callpulse_contracts::{
    error::CallpulseResult,
    metrics::{MetricsWindow, QueueBoardRow},
    query::{Deadline, TimeWindow},
};
use callpulse_core::StatsService;

use crate::mock_data::{shift_end, shift_start};

use super::morning_service;

pub fn shift_window() -> CallpulseResult<TimeWindow> {
    TimeWindow::new(shift_start(), shift_end())
}

/// Whole-centre metrics over the shift at the configured threshold.
pub fn shift_metrics(service: &StatsService) -> CallpulseResult<MetricsWindow> {
    service.metrics(&shift_window()?, None, None, &Deadline::none())
}

pub fn shift_board(service: &StatsService) -> CallpulseResult<Vec<QueueBoardRow>> {
    service.queue_board(&shift_window()?, shift_end(), &Deadline::none())
}

/// Run Scenario 2: Service Level.
pub fn run_scenario() -> CallpulseResult<()> {
    println!("=== Scenario 2: Service Level ===");
    println!();

    let service = morning_service()?;
    let metrics = shift_metrics(&service)?;

    println!("  Window: {} → {}", shift_start(), shift_end());
    print_metrics(&metrics);

    // A stricter target over the same traffic.
    let strict = service.metrics(&shift_window()?, Some(10), None, &Deadline::none())?;
    println!(
        "  SLA at {} s instead: {:.2}% ({} within)",
        strict.sla.threshold_secs, strict.sla.percentage, strict.sla.answered_within
    );
    println!();

    println!("  Queue board at {}:", shift_end());
    println!(
        "    {:<6} {:<10} {:>7} {:>9} {:>9} {:>8} {:>8} {:>8}",
        "QUEUE", "NAME", "WAITING", "LOGGED IN", "AVAILABLE", "RECEIVED", "ANSWER%", "SLA%"
    );
    for row in shift_board(&service)? {
        println!(
            "    {:<6} {:<10} {:>7} {:>9} {:>9} {:>8} {:>8.2} {:>8.2}",
            row.queue_id,
            row.display_name,
            row.calls_waiting,
            row.agents_logged_in,
            row.agents_available,
            row.received,
            row.answer_rate,
            row.sla_percentage,
        );
    }

    println!();
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

/// Shared with the legacy import and replay scenarios so both sources print
/// the same way.
pub(crate) fn print_metrics(m: &MetricsWindow) {
    let t = &m.totals;
    println!(
        "  Calls: {} received, {} answered, {} abandoned ({} timeout, {} exit key), {} transferred, {} unresolved",
        t.received, t.answered, t.abandoned, t.timeout, t.exit_with_key, t.transferred, t.unresolved
    );
    println!(
        "  SLA ({} s): {:.2}% ({} of {} within threshold)",
        m.sla.threshold_secs, m.sla.percentage, m.sla.answered_within, t.received
    );
    println!(
        "  Rates: answer {:.2}%, abandon {:.2}%",
        m.rates.answer_rate, m.rates.abandon_rate
    );
    println!(
        "  Wait: avg {} s, max {} s, p90 {} s over {} sample(s)",
        show(m.wait.avg_secs),
        show(m.wait.max_secs),
        show(m.wait.p90_secs),
        m.wait.samples
    );
    println!(
        "  Talk: total {} s, avg {} s",
        m.talk.total_secs,
        show(m.talk.avg_secs)
    );
    let c = &m.correlation;
    if c.uncorrelated_entries + c.answered_without_wait + c.inconsistent_waits > 0 {
        println!(
            "  Correlation: {} still queued, {} answered without wait sample, {} inconsistent",
            c.uncorrelated_entries, c.answered_without_wait, c.inconsistent_waits
        );
    }
    if let Some(agents) = &m.agents {
        println!(
            "  Agents: {} logged in, {} available, {} busy, {} paused",
            agents.logged_in, agents.available, agents.busy, agents.paused
        );
    }
    if let Some(current) = &m.current {
        println!(
            "  Now: {} waiting, longest {} s",
            current.calls_waiting, current.longest_wait_secs
        );
    }
    if m.discarded_tokens > 0 {
        println!("  Discarded: {} malformed token(s)", m.discarded_tokens);
    }
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use callpulse_contracts::{event::QueueId, metrics::MetricsSource};

    use super::*;

    #[test]
    fn test_shift_totals() {
        let service = morning_service().unwrap();
        let m = shift_metrics(&service).unwrap();

        assert_eq!(m.source, MetricsSource::EventLog);
        assert_eq!(m.totals.received, 6);
        assert_eq!(m.totals.answered, 3);
        assert_eq!(m.totals.abandoned, 2);
        assert_eq!(m.totals.timeout, 1);
        assert_eq!(m.totals.transferred, 1);
        assert_eq!(m.totals.unresolved, 1);
        assert_eq!(m.correlation.uncorrelated_entries, 1);
    }

    #[test]
    fn test_shift_sla_and_waits() {
        let service = morning_service().unwrap();
        let m = shift_metrics(&service).unwrap();

        // waits 4, 12, 30 against 20 s
        assert_eq!(m.sla.threshold_secs, 20);
        assert_eq!(m.sla.answered_within, 2);
        assert_eq!(m.sla.percentage, 33.33);
        assert_eq!(m.rates.answer_rate, 50.0);
        assert_eq!(m.rates.abandon_rate, 33.33);
        assert_eq!(m.wait.avg_secs, Some(15.33));
        assert_eq!(m.wait.max_secs, Some(30));
        assert_eq!(m.talk.total_secs, 468);
    }

    #[test]
    fn test_stricter_threshold() {
        let service = morning_service().unwrap();
        let m = service
            .metrics(&shift_window().unwrap(), Some(10), None, &Deadline::none())
            .unwrap();
        assert_eq!(m.sla.answered_within, 1);
        assert_eq!(m.sla.percentage, 16.67);
    }

    #[test]
    fn test_single_queue_metrics() {
        let service = morning_service().unwrap();
        let sales = QueueId::new("501");
        let m = service
            .metrics(&shift_window().unwrap(), None, Some(&sales), &Deadline::none())
            .unwrap();
        assert_eq!(m.queue_id, Some(sales));
        assert_eq!(m.totals.received, 1);
        assert_eq!(m.totals.answered, 1);
        assert_eq!(m.totals.transferred, 1);
    }

    #[test]
    fn test_queue_board() {
        let service = morning_service().unwrap();
        let board = shift_board(&service).unwrap();
        assert_eq!(board.len(), 2);

        let support = &board[0];
        assert_eq!(support.display_name, "Support");
        assert_eq!(support.received, 5);
        assert_eq!(support.answered, 2);
        assert_eq!(support.calls_waiting, 1);
        assert_eq!(support.agents_logged_in, 2);
        assert_eq!(support.agents_available, 0);

        let sales = &board[1];
        assert_eq!(sales.display_name, "Sales");
        assert_eq!(sales.received, 1);
        assert_eq!(sales.agents_logged_in, 1);
    }

    #[test]
    fn test_show() {
        assert_eq!(show(Some(4)), "4");
        assert_eq!(show::<f64>(None), "n/a");
    }

    #[test]
    fn test_run_scenario() {
        run_scenario().unwrap();
    }
}
