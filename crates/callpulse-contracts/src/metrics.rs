//! The unified metrics representation.
//!
//! `MetricsWindow` is produced both by aggregating the event log and by
//! decoding legacy statistics payloads. Consumers never need to know which.
//! Optional fields serialise as `null` and mean "unknown", which is distinct
//! from zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{agent::AgentId, event::QueueId};

/// Where a `MetricsWindow` came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsSource {
    EventLog,
    LegacyPayload,
}

/// Call counters. `timeout` and `exit_with_key` are subsets of `abandoned`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTotals {
    pub received: u64,
    pub answered: u64,
    pub abandoned: u64,
    pub timeout: u64,
    pub exit_with_key: u64,
    pub transferred: u64,
    /// Calls neither answered nor abandoned inside the window.
    pub unresolved: u64,
}

/// Summary of a set of durations, in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub samples: u64,
    pub total_secs: u64,
    pub avg_secs: Option<f64>,
    pub max_secs: Option<u64>,
    /// Nearest-rank 90th percentile.
    pub p90_secs: Option<u64>,
}

impl Distribution {
    /// Summarise `values`. Empty input yields zero samples and `None` stats.
    pub fn from_samples(values: &[u64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let total: u64 = sorted.iter().sum();
        let count = sorted.len();
        // nearest rank: ceil(0.9 * n), 1-based
        let rank = (count * 9).div_ceil(10).max(1);
        Self {
            samples: count as u64,
            total_secs: total,
            avg_secs: Some(round2(total as f64 / count as f64)),
            max_secs: sorted.last().copied(),
            p90_secs: sorted.get(rank - 1).copied(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlaSummary {
    pub threshold_secs: u32,
    pub answered_within: u64,
    /// `answered_within / received * 100`; 0 when nothing was received.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub answer_rate: f64,
    pub abandon_rate: f64,
}

/// How much of the window could be correlated by call id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correlation {
    /// Queue entries with no connect or terminal event in the window.
    pub uncorrelated_entries: u64,
    /// Answered calls lacking an in-window entry/connect pair, so no wait
    /// sample (typically the entry precedes the window).
    pub answered_without_wait: u64,
    /// Connects stamped before their own queue entry; excluded from waits.
    pub inconsistent_waits: u64,
}

/// Agent head-counts, only known when the source reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCounts {
    pub logged_in: u64,
    pub available: u64,
    pub busy: u64,
    pub paused: u64,
}

/// Live queue snapshot, only known when the source reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    pub calls_waiting: u64,
    pub longest_wait_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsWindow {
    pub source: MetricsSource,
    pub queue_id: Option<QueueId>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub totals: CallTotals,
    pub wait: Distribution,
    pub talk: Distribution,
    pub sla: SlaSummary,
    pub rates: Rates,
    pub correlation: Correlation,
    pub agents: Option<AgentCounts>,
    pub current: Option<QueueSnapshot>,
    /// Records or tokens skipped as malformed while building this window.
    pub discarded_tokens: u64,
}

impl MetricsWindow {
    /// An all-zero window, the answer for a range with no activity.
    pub fn empty(source: MetricsSource, sla_threshold_secs: u32) -> Self {
        Self {
            source,
            queue_id: None,
            start: None,
            end: None,
            totals: CallTotals::default(),
            wait: Distribution::default(),
            talk: Distribution::default(),
            sla: SlaSummary {
                threshold_secs: sla_threshold_secs,
                answered_within: 0,
                percentage: 0.0,
            },
            rates: Rates::default(),
            correlation: Correlation::default(),
            agents: None,
            current: None,
            discarded_tokens: 0,
        }
    }

    /// Recompute `sla.percentage` and `rates` from the counters.
    pub fn refresh_rates(&mut self) {
        let received = self.totals.received;
        self.sla.percentage = percentage(self.sla.answered_within, received);
        self.rates = Rates {
            answer_rate: percentage(self.totals.answered, received),
            abandon_rate: percentage(self.totals.abandoned, received),
        };
    }
}

/// Per-agent activity over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentActivity {
    pub agent_id: AgentId,
    pub display_name: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub calls_answered: u64,
    pub talk: Distribution,
    pub pause_count: u64,
    pub pause_secs: i64,
    pub missed_rings: u64,
    pub events_seen: u64,
}

/// One row of the live queue board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueBoardRow {
    pub queue_id: QueueId,
    pub display_name: String,
    pub calls_waiting: u64,
    pub agents_logged_in: u64,
    pub agents_available: u64,
    pub received: u64,
    pub answered: u64,
    pub answer_rate: f64,
    pub sla_percentage: f64,
}

/// `part / whole * 100`, rounded to two decimals; 0 when `whole` is 0.
pub fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 / whole as f64 * 100.0)
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
