//! Query parameters: scopes, time windows and deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    agent::AgentId,
    error::{CallpulseError, CallpulseResult},
    event::QueueId,
};

/// Unique identifier of one service query, attached to its logs and result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(pub uuid::Uuid);

impl QueryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which agents a current-state query covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "id")]
pub enum Scope {
    All,
    Agent(AgentId),
    /// Agents with activity in this queue inside the lookback window.
    Queue(QueueId),
}

/// A closed-open time range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, rejecting `end < start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CallpulseResult<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Reject `end < start`. Windows built as literals or deserialised from
    /// a request bypass [`TimeWindow::new`], so services call this again.
    pub fn validate(&self) -> CallpulseResult<()> {
        if self.end < self.start {
            return Err(CallpulseError::InvalidWindow {
                reason: format!("window end {} precedes start {}", self.end, self.start),
            });
        }
        Ok(())
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }
}

/// Shared cancellation switch. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Caller-supplied time budget and cancellation signal for one query.
///
/// Services call [`Deadline::check`] between phases; event sources receive
/// the same value so storage reads observe the caller's timeout.
#[derive(Debug, Clone)]
pub struct Deadline {
    started: Instant,
    budget: Option<Duration>,
    cancel: CancelFlag,
}

impl Deadline {
    /// No time limit and no cancellation.
    pub fn none() -> Self {
        Self {
            started: Instant::now(),
            budget: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn after(budget: Duration) -> Self {
        Self {
            budget: Some(budget),
            ..Self::none()
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fail fast when the query was cancelled or ran out of time.
    pub fn check(&self, phase: &str) -> CallpulseResult<()> {
        if self.cancel.is_cancelled() {
            return Err(CallpulseError::Cancelled {
                reason: format!("cancelled during {}", phase),
            });
        }
        if let Some(budget) = self.budget {
            let elapsed = self.started.elapsed();
            if elapsed >= budget {
                return Err(CallpulseError::DeadlineExceeded {
                    elapsed_ms: elapsed.as_millis(),
                    phase: phase.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
