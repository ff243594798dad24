//! Service results that bundle several per-agent views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    agent::{AgentState, Status},
    interval::{PauseInterval, SessionInterval},
    query::QueryId,
};

/// Everything the wallboard shows for one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub state: AgentState,
    /// Most recent session in the lookback window, open or closed.
    pub session: Option<SessionInterval>,
    /// Most recent pause in the lookback window, open or closed.
    pub pause: Option<PauseInterval>,
    /// Inconsistencies repaired while rebuilding the intervals.
    pub recovered: u32,
}

/// Agent head-count per status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub total: u64,
    pub by_status: BTreeMap<Status, u64>,
}

impl StatusSummary {
    /// Count `states`, listing every status even when its count is zero.
    pub fn tally<'a>(states: impl IntoIterator<Item = &'a AgentState>) -> Self {
        let mut by_status: BTreeMap<Status, u64> = Status::ALL.iter().map(|s| (*s, 0)).collect();
        let mut total = 0;
        for state in states {
            *by_status.entry(state.status).or_default() += 1;
            total += 1;
        }
        Self { total, by_status }
    }

    pub fn count(&self, status: Status) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentStateReport {
    pub query_id: QueryId,
    pub generated_at: DateTime<Utc>,
    pub lookback_start: DateTime<Utc>,
    /// Ordered by agent id.
    pub agents: Vec<AgentSnapshot>,
    pub summary: StatusSummary,
}
