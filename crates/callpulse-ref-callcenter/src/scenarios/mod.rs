//! Call-center reference runtime demo scenarios.
//!
//! Each scenario is a self-contained module that wires up real callpulse
//! components (event log, catalog, classifier, stats service) with the mock
//! morning shift and demonstrates one kind of query.

use callpulse_classify::RuleClassifier;
use callpulse_contracts::{config::EngineConfig, error::CallpulseResult};
use callpulse_core::StatsService;
use callpulse_store::{read_queue_log, InMemoryEventLog, StaticCatalog};
use tracing::info;

use crate::mock_data::MORNING_QUEUE_LOG;

pub mod agent_monitor;
pub mod legacy_import;
pub mod replay;
pub mod service_level;

// ── Embedded configuration ────────────────────────────────────────────────────

const CALLCENTER_CONFIG: &str = include_str!("../../config/callcenter.toml");
const CALLCENTER_CATALOG: &str = include_str!("../../config/catalog.toml");

pub fn engine_config() -> CallpulseResult<EngineConfig> {
    EngineConfig::from_toml_str(CALLCENTER_CONFIG)
}

pub fn catalog() -> CallpulseResult<StaticCatalog> {
    StaticCatalog::from_toml_str(CALLCENTER_CATALOG)
}

// ── Wiring ────────────────────────────────────────────────────────────────────

/// Load the mock morning shift into a fresh in-memory log.
pub fn morning_log() -> CallpulseResult<InMemoryEventLog> {
    let import = read_queue_log(MORNING_QUEUE_LOG);
    info!(
        accepted = import.events.len(),
        skipped = import.skipped,
        "mock queue_log loaded"
    );
    let log = InMemoryEventLog::new("morning-queue-log");
    log.extend(import.events)?;
    Ok(log)
}

/// Build a service over `log` with the embedded catalog and `config`.
pub fn build_service(log: InMemoryEventLog, config: EngineConfig) -> CallpulseResult<StatsService> {
    let classifier = RuleClassifier::from_config(&config);
    StatsService::new(Box::new(log), Box::new(catalog()?), Box::new(classifier), config)
}

/// The service every scenario uses: mock shift, embedded configuration.
pub fn morning_service() -> CallpulseResult<StatsService> {
    build_service(morning_log()?, engine_config()?)
}
