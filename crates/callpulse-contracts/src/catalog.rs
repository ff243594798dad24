//! Static reference mappings from device ids to display names.
//!
//! Owned by the storage layer; the engine only reads them. Staleness is
//! acceptable because names never affect derived state.

use serde::{Deserialize, Serialize};

use crate::{agent::AgentId, event::QueueId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCatalogEntry {
    pub agent_id: AgentId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueCatalogEntry {
    pub queue_id: QueueId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Name shown for an agent the catalog does not know.
pub fn fallback_agent_name(agent_id: &AgentId) -> String {
    format!("Agent {}", agent_id)
}

/// Name shown for a queue the catalog does not know.
pub fn fallback_queue_name(queue_id: &QueueId) -> String {
    queue_id.0.clone()
}
