//! The query service: wires an event source, a catalog and a classifier
//! into the status, interval and metrics queries.
//!
//! Every query follows the same pipeline:
//!
//!   validate → read (source) → classify → derive → name (catalog)
//!
//! No state survives between queries; each call re-reads its window and
//! re-derives everything, so concurrent callers never see each other's work.
//! The caller's `Deadline` is checked before the read, handed to the source
//! for the read itself, and checked again between agents.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use callpulse_contracts::{
    agent::{AgentId, Status},
    catalog::{fallback_agent_name, fallback_queue_name},
    config::EngineConfig,
    error::{CallpulseError, CallpulseResult},
    event::{sort_events, Event, QueueId},
    metrics::{AgentActivity, MetricsSource, MetricsWindow, QueueBoardRow},
    query::{Deadline, QueryId, Scope, TimeWindow},
    report::{AgentSnapshot, CurrentStateReport, StatusSummary},
};

use crate::{
    aggregate,
    resolver::{self, StatusMapping},
    tracker,
    traits::{Catalog, Classifier, EventFilter, EventSource},
};

/// Read-only statistics service over an external event log.
///
/// Holds no mutable state and is `Send + Sync`; share one instance across
/// request handlers.
pub struct StatsService {
    source: Box<dyn EventSource>,
    catalog: Box<dyn Catalog>,
    classifier: Box<dyn Classifier>,
    config: EngineConfig,
}

impl StatsService {
    /// Build a service. The configuration is validated here so a bad
    /// lookback or threshold fails at startup rather than on first query.
    pub fn new(
        source: Box<dyn EventSource>,
        catalog: Box<dyn Catalog>,
        classifier: Box<dyn Classifier>,
        config: EngineConfig,
    ) -> CallpulseResult<Self> {
        config.validate()?;
        Ok(Self { source, catalog, classifier, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn mapping(&self) -> StatusMapping {
        StatusMapping { ringing_status: self.config.ringing_status }
    }

    /// Current status, session and pause of every agent in `scope`, derived
    /// from the lookback window ending at `now`.
    ///
    /// An agent scope with no activity yields a single offline snapshot.
    pub fn current_state(
        &self,
        scope: &Scope,
        now: DateTime<Utc>,
        deadline: &Deadline,
    ) -> CallpulseResult<CurrentStateReport> {
        let query_id = QueryId::new();
        let lookback_start = now
            .checked_sub_signed(self.config.lookback()?)
            .ok_or_else(|| CallpulseError::InvalidWindow {
                reason: format!("lookback from {} precedes the earliest representable time", now),
            })?;

        info!(
            query_id = %query_id.0,
            scope = ?scope,
            lookback_start = %lookback_start,
            "current state query"
        );

        let filter = match scope {
            Scope::Agent(agent) => EventFilter::agent(agent.clone()),
            // Queue scope selects agents by queue activity but resolves them
            // from their full history, so read unfiltered.
            Scope::All | Scope::Queue(_) => EventFilter::all(),
        };
        let events = self.load(lookback_start, now, &filter, deadline)?;

        let mut by_agent: BTreeMap<AgentId, Vec<Event>> = BTreeMap::new();
        for event in events {
            if let Some(agent) = event.agent_id.clone() {
                by_agent.entry(agent).or_default().push(event);
            }
        }

        match scope {
            Scope::Agent(agent) => {
                by_agent.entry(agent.clone()).or_default();
            }
            Scope::Queue(queue) => {
                by_agent.retain(|_, events| {
                    events.iter().any(|e| e.queue_id.as_ref() == Some(queue))
                });
            }
            Scope::All => {}
        }

        let mut agents = Vec::with_capacity(by_agent.len());
        for (agent_id, agent_events) in &by_agent {
            deadline.check("agent resolution")?;
            agents.push(self.snapshot(agent_id, agent_events, lookback_start)?);
        }

        let summary = StatusSummary::tally(agents.iter().map(|s| &s.state));
        info!(
            query_id = %query_id.0,
            agents = summary.total,
            busy = summary.count(Status::Busy),
            paused = summary.count(Status::Paused),
            "current state resolved"
        );

        Ok(CurrentStateReport {
            query_id,
            generated_at: now,
            lookback_start,
            agents,
            summary,
        })
    }

    /// Call metrics over `window`, optionally restricted to one queue.
    ///
    /// `sla_threshold` falls back to the configured default; an explicit 0
    /// is rejected before any read.
    pub fn metrics(
        &self,
        window: &TimeWindow,
        sla_threshold: Option<u32>,
        queue: Option<&QueueId>,
        deadline: &Deadline,
    ) -> CallpulseResult<MetricsWindow> {
        window.validate()?;
        let threshold = self.threshold(sla_threshold)?;
        let filter = match queue {
            Some(queue) => EventFilter::queue(queue.clone()),
            None => EventFilter::all(),
        };

        debug!(
            start = %window.start,
            end = %window.end,
            queue = ?queue,
            threshold,
            "metrics query"
        );

        let events = self.load(window.start, window.end, &filter, deadline)?;
        deadline.check("aggregation")?;

        let mut metrics = aggregate::aggregate(&events, window, threshold);
        metrics.queue_id = queue.cloned();
        Ok(metrics)
    }

    /// One row per queue: traffic over `window` plus agent head-counts as
    /// of `now`.
    pub fn queue_board(
        &self,
        window: &TimeWindow,
        now: DateTime<Utc>,
        deadline: &Deadline,
    ) -> CallpulseResult<Vec<QueueBoardRow>> {
        window.validate()?;
        let threshold = self.config.sla_threshold_default_secs;
        let events = self.load(window.start, window.end, &EventFilter::all(), deadline)?;
        let per_queue = aggregate::queue_breakdown(&events, window, threshold);

        let states = self.current_state(&Scope::All, now, deadline)?;

        // (logged in, available) per queue. An agent counts towards the queue
        // of its open session, or of its last event when it has none.
        let mut heads: BTreeMap<QueueId, (u64, u64)> = BTreeMap::new();
        for snapshot in &states.agents {
            let open_session = snapshot.session.as_ref().filter(|s| s.is_open());
            let logged_in = open_session.is_some() || snapshot.state.status != Status::Offline;
            if !logged_in {
                continue;
            }
            let queue = open_session
                .and_then(|s| s.queue_id.clone())
                .or_else(|| snapshot.state.queue_id.clone());
            let Some(queue) = queue else {
                continue;
            };
            let entry = heads.entry(queue).or_default();
            entry.0 += 1;
            if snapshot.state.status == Status::Available {
                entry.1 += 1;
            }
        }

        let queues: BTreeSet<QueueId> =
            per_queue.keys().chain(heads.keys()).cloned().collect();

        let mut rows = Vec::with_capacity(queues.len());
        for queue in queues {
            deadline.check("queue board")?;
            let empty = MetricsWindow::empty(MetricsSource::EventLog, threshold);
            let metrics = per_queue.get(&queue).unwrap_or(&empty);
            let (logged_in, available) = heads.get(&queue).copied().unwrap_or((0, 0));
            rows.push(QueueBoardRow {
                display_name: self.queue_display_name(&queue)?,
                calls_waiting: metrics.correlation.uncorrelated_entries,
                agents_logged_in: logged_in,
                agents_available: available,
                received: metrics.totals.received,
                answered: metrics.totals.answered,
                answer_rate: metrics.rates.answer_rate,
                sla_percentage: metrics.sla.percentage,
                queue_id: queue,
            });
        }
        Ok(rows)
    }

    /// Daily-style activity of one agent over `window`.
    pub fn agent_activity(
        &self,
        agent: &AgentId,
        window: &TimeWindow,
        deadline: &Deadline,
    ) -> CallpulseResult<AgentActivity> {
        window.validate()?;
        let events = self.load(window.start, window.end, &EventFilter::agent(agent.clone()), deadline)?;
        deadline.check("agent activity")?;

        let mut activity = aggregate::agent_activity(agent, &events, window);
        activity.display_name = Some(self.agent_display_name(agent)?);
        Ok(activity)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn threshold(&self, requested: Option<u32>) -> CallpulseResult<u32> {
        match requested {
            Some(0) => Err(CallpulseError::InvalidWindow {
                reason: "SLA threshold must be greater than zero".to_string(),
            }),
            Some(secs) => Ok(secs),
            None => Ok(self.config.sla_threshold_default_secs),
        }
    }

    /// Read and classify `[from, until)`, returned in `(timestamp, sequence)`
    /// order.
    fn load(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        filter: &EventFilter,
        deadline: &Deadline,
    ) -> CallpulseResult<Vec<Event>> {
        deadline.check("event read")?;

        let raw = self.source.events_between(from, until, filter, deadline).map_err(|e| {
            warn!(source = %self.source.name(), error = %e, "event source read failed");
            e
        })?;

        deadline.check("classification")?;
        let mut events: Vec<Event> = raw
            .into_iter()
            .map(|r| {
                let kind = self.classifier.classify(&r.code);
                Event::from_raw(r, kind)
            })
            .collect();
        sort_events(&mut events);

        debug!(source = %self.source.name(), count = events.len(), "events loaded");
        Ok(events)
    }

    fn snapshot(
        &self,
        agent_id: &AgentId,
        events: &[Event],
        lookback_start: DateTime<Utc>,
    ) -> CallpulseResult<AgentSnapshot> {
        let latest = resolver::latest_event(events);
        let mut state = resolver::resolve(agent_id.clone(), latest, self.mapping());
        state.display_name = Some(self.agent_display_name(agent_id)?);

        let timeline = tracker::reconstruct(agent_id, events, lookback_start);
        if timeline.recovered > 0 {
            warn!(
                agent_id = %agent_id,
                recovered = timeline.recovered,
                "repaired inconsistent session/pause sequence"
            );
        }

        Ok(AgentSnapshot {
            state,
            session: timeline.current_session().cloned(),
            pause: timeline.current_pause().cloned(),
            recovered: timeline.recovered,
        })
    }

    fn agent_display_name(&self, agent: &AgentId) -> CallpulseResult<String> {
        Ok(self
            .catalog
            .agent_name(agent)?
            .unwrap_or_else(|| fallback_agent_name(agent)))
    }

    fn queue_display_name(&self, queue: &QueueId) -> CallpulseResult<String> {
        Ok(self
            .catalog
            .queue_name(queue)?
            .unwrap_or_else(|| fallback_queue_name(queue)))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
