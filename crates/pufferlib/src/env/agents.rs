//! Agent-keyed tables, padding and masks.

use super::EnvInfo;
use indexmap::IndexMap;

/// Agent name
pub type AgentId = String;

/// Per-agent values in a fixed iteration order
pub type AgentTable<V> = IndexMap<AgentId, V>;

/// Expand `data` to one entry per agent in `agents`, in that order.
///
/// Missing agents get `pad`. Entries for agents outside `agents` are
/// dropped.
pub fn pad_agent_data<V: Clone>(data: &AgentTable<V>, agents: &[AgentId], pad: &V) -> AgentTable<V> {
    agents
        .iter()
        .map(|agent| {
            let value = data.get(agent).unwrap_or(pad).clone();
            (agent.clone(), value)
        })
        .collect()
}

/// Which agents were present in a table before padding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentMask {
    present: IndexMap<AgentId, bool>,
}

impl AgentMask {
    /// Mark each of `agents` present iff it has an entry in `data`
    pub fn from_table<V>(data: &AgentTable<V>, agents: &[AgentId]) -> Self {
        Self {
            present: agents
                .iter()
                .map(|agent| (agent.clone(), data.contains_key(agent)))
                .collect(),
        }
    }

    pub fn is_present(&self, agent: &str) -> bool {
        self.present.get(agent).copied().unwrap_or(false)
    }

    pub fn get(&self, agent: &str) -> Option<bool> {
        self.present.get(agent).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AgentId, bool)> {
        self.present.iter().map(|(k, &v)| (k, v))
    }

    /// Number of agents marked present
    pub fn num_present(&self) -> usize {
        self.present.values().filter(|&&p| p).count()
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }

    /// Pad `infos` to every masked agent and record presence in each.
    pub fn annotate(&self, infos: &AgentTable<EnvInfo>) -> AgentTable<EnvInfo> {
        self.present
            .iter()
            .map(|(agent, &present)| {
                let info = infos.get(agent).cloned().unwrap_or_default();
                (agent.clone(), info.with_mask(present))
            })
            .collect()
    }
}
