//! Mock multi-agent environment for testing emulation layer features.

use pufferlib::env::{
    Action, AgentId, AgentTable, EnvInfo, Observation, RawMultiAgentEnv, RawMultiAgentStep,
};
use pufferlib::spaces::{Box as BoxSpace, DType, Dict, Discrete, DynSpace, Sample};
use pufferlib::Result;

/// A simple multi-agent environment where agents move on a 1D line.
///
/// Only even-numbered agents are ever active, which exercises padding and
/// masking of the rest. Every agent terminates after `max_ticks` steps.
///
/// Observation: `{position: f32[1], id: i32}`
/// Action: `Discrete(3)` (left, stay, right)
pub struct MockMarl {
    num_agents: usize,
    agent_positions: Vec<f32>,
    tick: u32,
    max_ticks: u32,
    /// Native actions received on the last step
    pub last_actions: AgentTable<Action>,
}

impl MockMarl {
    const BOUND: f32 = 10.0;

    pub fn new(num_agents: usize) -> Self {
        Self::with_max_ticks(num_agents, 10)
    }

    pub fn with_max_ticks(num_agents: usize, max_ticks: u32) -> Self {
        Self {
            num_agents,
            agent_positions: vec![0.0; num_agents],
            tick: 0,
            max_ticks,
            last_actions: AgentTable::new(),
        }
    }

    pub fn position(&self, index: usize) -> Option<f32> {
        self.agent_positions.get(index).copied()
    }

    fn name(index: usize) -> AgentId {
        format!("agent_{index}")
    }

    fn active(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_agents).filter(move |i| i % 2 == 0 && self.tick < self.max_ticks)
    }

    fn observe(&self, index: usize) -> Result<Observation> {
        Ok(Sample::dict([
            ("position", Sample::array(&[1], vec![self.agent_positions[index]])?),
            ("id", Sample::scalar(index as i32)),
        ]))
    }
}

impl RawMultiAgentEnv for MockMarl {
    fn possible_agents(&self) -> Vec<AgentId> {
        (0..self.num_agents).map(Self::name).collect()
    }

    fn agents(&self) -> Vec<AgentId> {
        self.active().map(Self::name).collect()
    }

    fn observation_space(&self, _agent: &str) -> DynSpace {
        Dict::from_pairs(vec![
            ("position", BoxSpace::uniform(&[1], -Self::BOUND as f64, Self::BOUND as f64).into()),
            (
                "id",
                BoxSpace::uniform(&[], 0.0, self.num_agents as f64)
                    .with_dtype(DType::I32)
                    .into(),
            ),
        ])
        .into()
    }

    fn action_space(&self, _agent: &str) -> DynSpace {
        Discrete::new(3).into()
    }

    fn reset(
        &mut self,
        _seed: Option<u64>,
    ) -> Result<(AgentTable<Observation>, AgentTable<EnvInfo>)> {
        self.agent_positions = vec![0.0; self.num_agents];
        self.tick = 0;
        self.last_actions.clear();

        let mut observations = AgentTable::new();
        let mut infos = AgentTable::new();
        for i in self.active() {
            observations.insert(Self::name(i), self.observe(i)?);
            infos.insert(Self::name(i), EnvInfo::new());
        }
        Ok((observations, infos))
    }

    fn step(&mut self, actions: &AgentTable<Action>) -> Result<RawMultiAgentStep> {
        let movers: Vec<usize> = self.active().collect();
        for &i in &movers {
            let choice = actions
                .get(&Self::name(i))
                .and_then(Sample::as_array)
                .and_then(|a| a.integer_values())
                .and_then(|v| v.first().copied())
                .unwrap_or(1);
            let moved = self.agent_positions[i] + (choice as f32 - 1.0);
            self.agent_positions[i] = moved.clamp(-Self::BOUND, Self::BOUND);
        }
        self.last_actions = actions.clone();
        self.tick += 1;
        let done = self.tick >= self.max_ticks;
        if done {
            tracing::debug!(tick = self.tick, agents = movers.len(), "population finished");
        }

        let mut result = RawMultiAgentStep::default();
        for &i in &movers {
            let name = Self::name(i);
            result.observations.insert(name.clone(), self.observe(i)?);
            result.rewards.insert(name.clone(), 1.0);
            result.terminated.insert(name.clone(), done);
            result.truncated.insert(name.clone(), false);
            result.infos.insert(name, EnvInfo::new());
        }
        Ok(result)
    }
}
