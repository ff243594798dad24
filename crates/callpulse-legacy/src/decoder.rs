//! Legacy statistics payload → `MetricsWindow`.
//!
//! The payload carries pre-computed counters under fixed keys. Missing keys
//! read as zero for counters and as unknown (`None`) for averages and
//! maxima, so a decoded window is never mistaken for measured zeros.
//!
//! SLA% is `TOTAL_ANSWERED_SLA / TOTAL_RECEIVED × 100`. Payloads written
//! without `TOTAL_ANSWERED_SLA` report every answered call as within SLA.

use tracing::debug;

use callpulse_contracts::metrics::{
    round2, AgentCounts, Distribution, MetricsSource, MetricsWindow, QueueSnapshot,
};

use crate::parser::{unserialize, Unserialized};

pub const TOTAL_RECEIVED: &str = "TOTAL_RECEIVED";
pub const TOTAL_ANSWERED: &str = "TOTAL_ANSWERED";
pub const TOTAL_ANSWERED_SLA: &str = "TOTAL_ANSWERED_SLA";
pub const TOTAL_UNANSWERED: &str = "TOTAL_UNANSWERED";
pub const TOTAL_ABANDONED: &str = "TOTAL_ABANDONED";
pub const TOTAL_TRANSFERRED: &str = "TOTAL_TRANSFERRED";
pub const TOTAL_WAIT: &str = "TOTAL_WAIT";
pub const TOTAL_TALK: &str = "TOTAL_TALK";
pub const AVG_WAIT: &str = "AVG_WAIT";
pub const AVG_TALK: &str = "AVG_TALK";
pub const MAX_WAIT: &str = "MAX_WAIT";
pub const SLA_THRESHOLD: &str = "SLA_THRESHOLD";
pub const AGENTS_LOGGED_IN: &str = "AGENTS_LOGGED_IN";
pub const AGENTS_AVAILABLE: &str = "AGENTS_AVAILABLE";
pub const AGENTS_BUSY: &str = "AGENTS_BUSY";
pub const AGENTS_PAUSED: &str = "AGENTS_PAUSED";
pub const CALLS_WAITING: &str = "CALLS_WAITING";
pub const LONGEST_WAIT: &str = "LONGEST_WAIT";

/// Threshold assumed when the payload does not state one.
pub const DEFAULT_SLA_THRESHOLD_SECS: u32 = 60;

/// Decode `blob` into the unified metrics representation.
///
/// Never fails: malformed tokens are skipped and counted in
/// `discarded_tokens`, and an empty or unreadable blob yields an all-zero
/// window.
pub fn decode(blob: &str) -> MetricsWindow {
    from_pairs(&unserialize(blob))
}

/// Build the metrics window from already-extracted pairs.
pub fn from_pairs(raw: &Unserialized) -> MetricsWindow {
    let count = |key: &str| raw.u64(key).unwrap_or(0);
    let threshold = raw
        .u64(SLA_THRESHOLD)
        .and_then(|t| u32::try_from(t).ok())
        .filter(|t| *t > 0)
        .unwrap_or(DEFAULT_SLA_THRESHOLD_SECS);

    let mut metrics = MetricsWindow::empty(MetricsSource::LegacyPayload, threshold);

    let received = count(TOTAL_RECEIVED);
    let answered = count(TOTAL_ANSWERED);
    let abandoned = raw
        .u64(TOTAL_ABANDONED)
        .or_else(|| raw.u64(TOTAL_UNANSWERED))
        .unwrap_or(0);

    metrics.totals.received = received;
    metrics.totals.answered = answered;
    metrics.totals.abandoned = abandoned;
    metrics.totals.transferred = count(TOTAL_TRANSFERRED);
    metrics.totals.unresolved = received.saturating_sub(answered).saturating_sub(abandoned);

    metrics.wait = distribution(raw, answered, TOTAL_WAIT, AVG_WAIT, Some(MAX_WAIT));
    metrics.talk = distribution(raw, answered, TOTAL_TALK, AVG_TALK, None);

    metrics.sla.answered_within = raw.u64(TOTAL_ANSWERED_SLA).unwrap_or(answered);

    let agent_keys = [AGENTS_LOGGED_IN, AGENTS_AVAILABLE, AGENTS_BUSY, AGENTS_PAUSED];
    if agent_keys.iter().any(|k| raw.get(k).is_some()) {
        metrics.agents = Some(AgentCounts {
            logged_in: count(AGENTS_LOGGED_IN),
            available: count(AGENTS_AVAILABLE),
            busy: count(AGENTS_BUSY),
            paused: count(AGENTS_PAUSED),
        });
    }
    if raw.get(CALLS_WAITING).is_some() || raw.get(LONGEST_WAIT).is_some() {
        metrics.current = Some(QueueSnapshot {
            calls_waiting: count(CALLS_WAITING),
            longest_wait_secs: count(LONGEST_WAIT),
        });
    }

    metrics.discarded_tokens = raw.discarded;
    metrics.refresh_rates();

    debug!(
        received,
        answered,
        abandoned,
        sla = metrics.sla.percentage,
        discarded = raw.discarded,
        "decoded legacy payload"
    );

    metrics
}

/// Time statistics from pre-computed totals. Samples are the answered calls;
/// the average is taken as reported, else derived from the total.
fn distribution(
    raw: &Unserialized,
    answered: u64,
    total_key: &str,
    avg_key: &str,
    max_key: Option<&str>,
) -> Distribution {
    let total = raw.u64(total_key);
    let avg = raw.f64(avg_key).map(round2).or_else(|| match total {
        Some(total) if answered > 0 => Some(round2(total as f64 / answered as f64)),
        _ => None,
    });
    Distribution {
        samples: answered,
        total_secs: total.unwrap_or(0),
        avg_secs: avg,
        max_secs: max_key.and_then(|k| raw.u64(k)),
        p90_secs: None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::parser::{encode, LegacyValue};

    use super::*;

    const REFERENCE: &str = "a:3:{s:14:\"TOTAL_RECEIVED\";i:11;s:14:\"TOTAL_ANSWERED\";i:11;s:15:\"TOTAL_ABANDONED\";i:0;}";

    // ── Reference payload ────────────────────────────────────────────────────

    /// 11 received, 11 answered, 0 abandoned → SLA ≈ 100%.
    #[test]
    fn reference_payload_decodes_to_full_sla() {
        let m = decode(REFERENCE);
        assert_eq!(m.source, MetricsSource::LegacyPayload);
        assert_eq!(m.totals.received, 11);
        assert_eq!(m.totals.answered, 11);
        assert_eq!(m.totals.abandoned, 0);
        assert!((m.sla.percentage - 100.0).abs() < 0.01);
        assert_eq!(m.sla.threshold_secs, DEFAULT_SLA_THRESHOLD_SECS);
        assert_eq!(m.discarded_tokens, 0);
        assert_eq!(m.rates.answer_rate, 100.0);
        // No timing keys: unknown, not zero.
        assert_eq!(m.wait.avg_secs, None);
        assert!(m.agents.is_none());
        assert!(m.current.is_none());
    }

    #[test]
    fn answered_sla_key_wins_when_present() {
        let mut pairs = BTreeMap::new();
        pairs.insert(TOTAL_RECEIVED.to_string(), LegacyValue::Int(8));
        pairs.insert(TOTAL_ANSWERED.to_string(), LegacyValue::Int(6));
        pairs.insert(TOTAL_ANSWERED_SLA.to_string(), LegacyValue::Int(3));
        pairs.insert(SLA_THRESHOLD.to_string(), LegacyValue::Int(30));
        let m = decode(&encode(&pairs));
        assert_eq!(m.sla.answered_within, 3);
        assert_eq!(m.sla.percentage, 37.5);
        assert_eq!(m.sla.threshold_secs, 30);
        assert_eq!(m.totals.unresolved, 2);
    }

    // ── Malformed input ──────────────────────────────────────────────────────

    #[test]
    fn length_mismatch_is_discarded_and_counted() {
        let blob = "a:2:{s:5:\"TOTAL_RECEIVED\";i:40;s:14:\"TOTAL_ANSWERED\";i:7;}";
        let m = decode(blob);
        assert_eq!(m.totals.received, 0);
        assert_eq!(m.totals.answered, 7);
        assert_eq!(m.discarded_tokens, 1);
        // Nothing received means 0%, never NaN.
        assert_eq!(m.sla.percentage, 0.0);
    }

    #[test]
    fn corrupted_middle_pair_loses_only_itself() {
        let blob = concat!(
            "a:3:{s:14:\"TOTAL_RECEIVED\";i:11;s:14\"TOTAL_ANSWERED\";i:11;",
            "s:15:\"TOTAL_ABANDONED\";i:3;}"
        );
        let m = decode(blob);
        assert_eq!(m.totals.received, 11);
        assert_eq!(m.totals.answered, 0);
        assert_eq!(m.totals.abandoned, 3);
        assert_eq!(m.discarded_tokens, 1);
    }

    #[test]
    fn unterminated_value_discards_its_pair() {
        let m = decode("a:1:{s:14:\"TOTAL_RECEIVED\";i:1x2;}");
        assert_eq!(m.totals.received, 0);
        assert_eq!(m.discarded_tokens, 1);
    }

    #[test]
    fn non_finite_average_is_unknown() {
        let m = decode("a:2:{s:14:\"TOTAL_ANSWERED\";i:4;s:8:\"AVG_WAIT\";d:NAN;}");
        assert_eq!(m.wait.avg_secs, None);
        assert_eq!(m.totals.answered, 4);
    }

    #[test]
    fn empty_and_garbage_blobs_yield_zero_window() {
        let empty = decode("");
        assert_eq!(empty.totals.received, 0);
        assert_eq!(empty.discarded_tokens, 0);

        let garbage = decode("<html>502 Bad Gateway</html>");
        assert_eq!(garbage.totals.received, 0);
        assert!(garbage.discarded_tokens >= 1);
    }

    // ── Shapes ───────────────────────────────────────────────────────────────

    #[test]
    fn nested_containers_are_flattened() {
        let blob = concat!(
            "a:2:{s:5:\"calls\";a:2:{s:14:\"TOTAL_RECEIVED\";i:20;s:14:\"TOTAL_ANSWERED\";i:15;}",
            "s:6:\"agents\";a:2:{s:16:\"AGENTS_LOGGED_IN\";i:4;s:13:\"AGENTS_PAUSED\";i:1;}}"
        );
        let m = decode(blob);
        assert_eq!(m.totals.received, 20);
        assert_eq!(m.totals.answered, 15);
        let agents = m.agents.unwrap();
        assert_eq!(agents.logged_in, 4);
        assert_eq!(agents.paused, 1);
        assert_eq!(agents.available, 0);
        assert_eq!(m.discarded_tokens, 0);
    }

    #[test]
    fn numeric_strings_and_unknown_keys() {
        let blob = concat!(
            "a:4:{s:14:\"TOTAL_RECEIVED\";s:2:\"10\";s:14:\"TOTAL_ANSWERED\";s:1:\"9\";",
            "s:10:\"TOTAL_WAIT\";i:90;s:7:\"VERSION\";s:3:\"2.1\";}"
        );
        let m = decode(blob);
        assert_eq!(m.totals.received, 10);
        assert_eq!(m.totals.answered, 9);
        assert_eq!(m.wait.total_secs, 90);
        assert_eq!(m.wait.avg_secs, Some(10.0));
        assert_eq!(m.discarded_tokens, 0);
    }

    #[test]
    fn live_snapshot_keys() {
        let blob = "a:3:{s:13:\"CALLS_WAITING\";i:3;s:12:\"LONGEST_WAIT\";i:95;s:8:\"AVG_TALK\";d:61.456;}";
        let m = decode(blob);
        let current = m.current.unwrap();
        assert_eq!(current.calls_waiting, 3);
        assert_eq!(current.longest_wait_secs, 95);
        assert_eq!(m.talk.avg_secs, Some(61.46));
    }
}
