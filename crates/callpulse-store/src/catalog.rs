//! A fixed, in-memory display-name catalog.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use callpulse_contracts::{
    agent::AgentId,
    catalog::{AgentCatalogEntry, QueueCatalogEntry},
    error::{CallpulseError, CallpulseResult},
    event::QueueId,
};
use callpulse_core::traits::Catalog;

/// On-disk shape of a catalog file.
///
/// ```toml
/// [[agents]]
/// agent_id = "1001"
/// name = "Ana Souza"
///
/// [[queues]]
/// queue_id = "500"
/// name = "Support"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub agents: Vec<AgentCatalogEntry>,
    #[serde(default)]
    pub queues: Vec<QueueCatalogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    agents: BTreeMap<AgentId, String>,
    queues: BTreeMap<QueueId, QueueCatalogEntry>,
}

impl StaticCatalog {
    pub fn new(agents: Vec<AgentCatalogEntry>, queues: Vec<QueueCatalogEntry>) -> Self {
        Self {
            agents: agents.into_iter().map(|a| (a.agent_id, a.name)).collect(),
            queues: queues.into_iter().map(|q| (q.queue_id.clone(), q)).collect(),
        }
    }

    pub fn from_toml_str(s: &str) -> CallpulseResult<Self> {
        let file: CatalogFile = toml::from_str(s).map_err(|e| CallpulseError::ConfigError {
            reason: format!("failed to parse catalog TOML: {}", e),
        })?;
        Ok(Self::new(file.agents, file.queues))
    }

    pub fn from_file(path: &Path) -> CallpulseResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CallpulseError::ConfigError {
            reason: format!("failed to read catalog file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn queue_description(&self, queue: &QueueId) -> Option<&str> {
        self.queues.get(queue).and_then(|q| q.description.as_deref())
    }
}

impl Catalog for StaticCatalog {
    fn agent_name(&self, agent: &AgentId) -> CallpulseResult<Option<String>> {
        Ok(self.agents.get(agent).cloned())
    }

    fn queue_name(&self, queue: &QueueId) -> CallpulseResult<Option<String>> {
        Ok(self.queues.get(queue).map(|q| q.name.clone()))
    }
}
