//! # callpulse-contracts
//!
//! Shared types for the callpulse engine: the event model, agent state,
//! intervals, the unified metrics window, configuration and errors.
//!
//! All crates in the workspace import from here. Apart from configuration
//! loading, no logic lives in this crate.

pub mod agent;
pub mod catalog;
pub mod config;
pub mod error;
pub mod event;
pub mod interval;
pub mod metrics;
pub mod query;
pub mod report;

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use agent::AgentId;
    use config::EngineConfig;
    use error::CallpulseError;
    use event::{Event, EventKind, EventPayload, RawEvent};
    use metrics::{percentage, Distribution};
    use query::{CancelFlag, Deadline, TimeWindow};

    fn raw(agent: Option<&str>, code: &str) -> RawEvent {
        RawEvent {
            sequence: 7,
            agent: agent.map(str::to_string),
            queue: Some(" 500 ".to_string()),
            call_id: Some(String::new()),
            code: code.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap(),
            payload: EventPayload::new().with(EventPayload::REASON, "lunch"),
            duration_hint: None,
        }
    }

    // ── Event model ──────────────────────────────────────────────────────────

    #[test]
    fn event_from_raw_normalises_placeholder_ids() {
        let event = Event::from_raw(raw(Some("NONE"), "ENTERQUEUE"), EventKind::EnterQueue);
        assert_eq!(event.agent_id, None);
        assert_eq!(event.queue_id.unwrap().0, "500");
        // Empty call ids are treated as absent.
        assert_eq!(event.call_id, None);
        assert_eq!(event.raw_code, "ENTERQUEUE");
    }

    #[test]
    fn event_from_raw_keeps_real_agent() {
        let event = Event::from_raw(raw(Some("1001"), "PAUSE"), EventKind::Pause);
        assert_eq!(event.agent_id, Some(AgentId::new("1001")));
        assert_eq!(event.payload.reason(), Some("lunch"));
    }

    #[test]
    fn payload_drops_blank_values_and_parses_numbers() {
        let payload = EventPayload::new()
            .with(EventPayload::REASON, "   ")
            .with(EventPayload::HOLD_SECS, "12")
            .with(EventPayload::TALK_SECS, "not-a-number");
        assert_eq!(payload.reason(), None);
        assert_eq!(payload.hold_secs(), Some(12));
        assert_eq!(payload.talk_secs(), None);
    }

    #[test]
    fn event_kind_serialises_kebab_case() {
        let json = serde_json::to_string(&EventKind::ExitWithTimeout).unwrap();
        assert_eq!(json, "\"exit-with-timeout\"");
        let decoded: EventKind = serde_json::from_str("\"ring-no-answer\"").unwrap();
        assert_eq!(decoded, EventKind::RingNoAnswer);
    }

    #[test]
    fn event_kind_families() {
        assert!(EventKind::CompleteCaller.is_answer());
        assert!(EventKind::ExitWithKey.is_unanswered_exit());
        assert!(EventKind::EnterQueue.is_call_lifecycle());
        assert!(!EventKind::Pause.is_call_lifecycle());
        assert!(!EventKind::Unknown.is_answer());
    }

    // ── Windows and deadlines ────────────────────────────────────────────────

    #[test]
    fn time_window_rejects_inverted_range() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        match TimeWindow::new(start, end) {
            Err(CallpulseError::InvalidWindow { reason }) => assert!(reason.contains("precedes")),
            other => panic!("expected InvalidWindow, got {:?}", other),
        }
    }

    #[test]
    fn time_window_is_closed_open() {
        let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
        let window = TimeWindow::new(start, end).unwrap();
        assert!(window.contains(start));
        assert!(!window.contains(end));
    }

    #[test]
    fn deadline_observes_cancel_flag() {
        let flag = CancelFlag::new();
        let deadline = Deadline::none().with_cancel(flag.clone());
        assert!(deadline.check("scan").is_ok());

        flag.cancel();
        match deadline.check("scan") {
            Err(CallpulseError::Cancelled { reason }) => assert!(reason.contains("scan")),
            other => panic!("expected Cancelled, got {:?}", other),
        }
    }

    #[test]
    fn zero_budget_deadline_expires_immediately() {
        let deadline = Deadline::after(std::time::Duration::ZERO);
        assert!(matches!(
            deadline.check("read"),
            Err(CallpulseError::DeadlineExceeded { .. })
        ));
    }

    // ── Metrics helpers ──────────────────────────────────────────────────────

    #[test]
    fn percentage_guards_zero_denominator() {
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(11, 11), 100.0);
    }

    #[test]
    fn distribution_summarises_samples() {
        let dist = Distribution::from_samples(&[5, 1, 9, 3]);
        assert_eq!(dist.samples, 4);
        assert_eq!(dist.total_secs, 18);
        assert_eq!(dist.avg_secs, Some(4.5));
        assert_eq!(dist.max_secs, Some(9));
        assert_eq!(dist.p90_secs, Some(9));

        let empty = Distribution::from_samples(&[]);
        assert_eq!(empty.samples, 0);
        assert_eq!(empty.avg_secs, None);
    }

    // ── Configuration ────────────────────────────────────────────────────────

    #[test]
    fn config_defaults_fill_missing_fields() {
        let config = EngineConfig::from_toml_str("lookback_window_secs = 3600").unwrap();
        assert_eq!(config.sla_threshold_default_secs, 20);
        assert!(config.ringing_status);
        assert_eq!(config.precedence, config::default_precedence());
    }

    #[test]
    fn config_reads_custom_precedence() {
        let toml = r#"
            lookback_window_secs = 600
            sla_threshold_default_secs = 30
            ringing_status = false

            [[precedence]]
            id = "hangup"
            pattern = "hangup"
            kind = "complete-caller"
        "#;
        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.precedence.len(), 1);
        assert_eq!(config.precedence[0].kind, EventKind::CompleteCaller);
        assert!(!config.ringing_status);
    }

    #[test]
    fn config_rejects_zero_lookback() {
        match EngineConfig::from_toml_str("lookback_window_secs = 0") {
            Err(CallpulseError::ConfigError { reason }) => {
                assert!(reason.contains("lookback_window_secs"))
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn config_rejects_unrepresentable_lookback() {
        for secs in [u64::MAX, i64::MAX as u64] {
            match EngineConfig::with_lookback(secs).validate() {
                Err(CallpulseError::ConfigError { reason }) => {
                    assert!(reason.contains("out of range"))
                }
                other => panic!("expected ConfigError, got {:?}", other),
            }
        }
        let day = EngineConfig::with_lookback(86_400);
        assert_eq!(day.lookback().unwrap(), chrono::Duration::days(1));
    }

    #[test]
    fn config_requires_lookback() {
        match EngineConfig::from_toml_str("sla_threshold_default_secs = 10") {
            Err(CallpulseError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse engine TOML"))
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn config_rejects_empty_pattern() {
        let toml = r#"
            lookback_window_secs = 60

            [[precedence]]
            id = "blank"
            pattern = " "
            kind = "connect"
        "#;
        assert!(matches!(
            EngineConfig::from_toml_str(toml),
            Err(CallpulseError::ConfigError { .. })
        ));
    }

    // ── Reports ──────────────────────────────────────────────────────────────

    #[test]
    fn status_summary_lists_every_status() {
        use agent::{AgentState, Status};
        use report::StatusSummary;

        let mut busy = AgentState::offline(AgentId::new("1002"));
        busy.status = Status::Busy;
        let states = vec![AgentState::offline(AgentId::new("1001")), busy];

        let summary = StatusSummary::tally(&states);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.count(Status::Busy), 1);
        assert_eq!(summary.count(Status::Offline), 1);
        assert_eq!(summary.count(Status::Paused), 0);
        assert_eq!(summary.by_status.len(), Status::ALL.len());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["by_status"]["busy"], 1);
    }

    // ── Error display ────────────────────────────────────────────────────────

    #[test]
    fn upstream_error_names_source() {
        let err = CallpulseError::UpstreamUnavailable {
            source_name: "queue_log".to_string(),
            reason: "connection refused".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("queue_log"));
        assert!(msg.contains("connection refused"));
        assert!(!err.is_caller_error());
    }
}
