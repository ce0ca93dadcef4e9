//! Multi-agent emulation wrapper for PettingZoo-style parallel
//! environments.
//!
//! Every agent shares one observation and one action space, taken from the
//! first possible agent. Outputs always hold one entry per possible agent:
//! absent agents are padded and flagged through the agent mask.

use super::check::{check_array, SpaceCheck};
use super::make::{make_env, resolve_seed};
use super::{
    emulate_action_space, emulate_observation_space, pad_agent_data, Action, AgentId, AgentMask,
    AgentTable, EmulatedSpace, EmulationConfig, EnvInfo, MultiAgentStepResult, Observation,
    RawMultiAgentEnv,
};
use crate::spaces::{DynSpace, TypedArray};
use crate::{PufferError, Result};

/// Wrapper that flattens and pads a `RawMultiAgentEnv`
pub struct MultiAgentEmulation<E: RawMultiAgentEnv> {
    env: E,
    config: EmulationConfig,
    possible_agents: Vec<AgentId>,
    observation: EmulatedSpace,
    action: EmulatedSpace,
    /// Observation given to absent agents
    pad_observation: TypedArray,
    initialized: bool,
    all_done: bool,
    observation_check: SpaceCheck,
    action_check: SpaceCheck,
}

impl<E: RawMultiAgentEnv> MultiAgentEmulation<E> {
    pub fn new(env: E) -> Result<Self> {
        Self::with_config(env, EmulationConfig::default())
    }

    pub fn with_config(env: E, config: EmulationConfig) -> Result<Self> {
        let possible_agents = env.possible_agents();
        let first = possible_agents.first().ok_or_else(|| {
            PufferError::Config("multi-agent environment has no possible agents".to_string())
        })?;
        let observation = emulate_observation_space(&env.observation_space(first))?;
        let action = emulate_action_space(&env.action_space(first))?;
        let pad_observation = observation.zeros();

        tracing::debug!(
            num_agents = possible_agents.len(),
            observation_len = observation.flat_len(),
            action_len = action.flat_len(),
            "wrapped multi-agent environment"
        );

        Ok(Self {
            env,
            config,
            possible_agents,
            observation,
            action,
            pad_observation,
            initialized: false,
            all_done: false,
            observation_check: SpaceCheck::new(),
            action_check: SpaceCheck::new(),
        })
    }

    /// Wrap an environment given either an instance or a creator.
    pub fn make<F>(env: Option<E>, creator: Option<F>, config: EmulationConfig) -> Result<Self>
    where
        F: FnOnce() -> E,
    {
        Self::with_config(make_env(env, creator)?, config)
    }

    pub fn possible_agents(&self) -> &[AgentId] {
        &self.possible_agents
    }

    pub fn num_agents(&self) -> usize {
        self.possible_agents.len()
    }

    /// Agents currently active in the wrapped environment
    pub fn agents(&self) -> Vec<AgentId> {
        self.env.agents()
    }

    /// True once no agents remain or every agent terminated on the last step
    pub fn done(&self) -> bool {
        self.all_done || self.env.agents().is_empty()
    }

    /// Flat observation space shared by all agents
    pub fn single_observation_space(&self) -> &DynSpace {
        self.observation.flat_space()
    }

    /// Flat action space shared by all agents
    pub fn single_action_space(&self) -> &DynSpace {
        self.action.flat_space()
    }

    pub fn observation_space(&self, agent: &str) -> Result<&DynSpace> {
        self.require_agent(agent)?;
        Ok(self.observation.flat_space())
    }

    pub fn action_space(&self, agent: &str) -> Result<&DynSpace> {
        self.require_agent(agent)?;
        Ok(self.action.flat_space())
    }

    pub fn emulated_observation(&self) -> &EmulatedSpace {
        &self.observation
    }

    pub fn emulated_action(&self) -> &EmulatedSpace {
        &self.action
    }

    /// Whether the one-time observation and action checks have passed
    pub fn checks_passed(&self) -> (bool, bool) {
        (
            self.observation_check.is_checked(),
            self.action_check.is_checked(),
        )
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    fn require_agent(&self, agent: &str) -> Result<()> {
        if self.possible_agents.iter().any(|a| a == agent) {
            Ok(())
        } else {
            Err(PufferError::InvalidAgent {
                agent: agent.to_string(),
                expected: self.possible_agents.clone(),
            })
        }
    }

    /// Flatten the observations of possible agents, checking the first one.
    fn emulate_observations(
        &mut self,
        observations: &AgentTable<Observation>,
    ) -> Result<AgentTable<TypedArray>> {
        let mut flat = AgentTable::with_capacity(observations.len());
        for agent in &self.possible_agents {
            if let Some(ob) = observations.get(agent) {
                flat.insert(agent.clone(), self.observation.emulate(ob)?);
            }
        }
        if self.config.check_spaces {
            if let Some(first) = flat.values().next() {
                let space = self.observation.flat_space();
                self.observation_check.run(|| check_array(first, space))?;
            }
        }
        Ok(flat)
    }

    pub fn reset(
        &mut self,
        seed: Option<u64>,
    ) -> Result<(AgentTable<TypedArray>, AgentTable<EnvInfo>)> {
        let seed = resolve_seed(seed, self.env.supports_seeding());
        let (observations, infos) = self.env.reset(seed)?;
        self.initialized = true;
        self.all_done = false;

        let flat = self.emulate_observations(&observations)?;
        let mask = AgentMask::from_table(&flat, &self.possible_agents);
        let observations = pad_agent_data(&flat, &self.possible_agents, &self.pad_observation);
        Ok((observations, mask.annotate(&infos)))
    }

    pub fn step(&mut self, actions: &AgentTable<TypedArray>) -> Result<MultiAgentStepResult> {
        if !self.initialized {
            return Err(PufferError::ApiUsage(
                "step() called before reset()".to_string(),
            ));
        }
        if self.done() {
            return Err(PufferError::ApiUsage(
                "step() called after all agents finished; call reset()".to_string(),
            ));
        }
        for agent in actions.keys() {
            self.require_agent(agent)?;
        }
        if self.config.check_spaces {
            if let Some(first) = actions.values().next() {
                let space = self.action.flat_space();
                self.action_check.run(|| check_array(first, space))?;
            }
        }

        // Actions for agents no longer active are dropped
        let active = self.env.agents();
        let mut native: AgentTable<Action> = AgentTable::with_capacity(actions.len());
        for (agent, action) in actions {
            if active.contains(agent) {
                native.insert(agent.clone(), self.action.nativize(action)?);
            }
        }

        let raw = self.env.step(&native)?;
        let flat = self.emulate_observations(&raw.observations)?;
        self.all_done = raw.terminated.values().all(|&d| d);
        if self.all_done {
            tracing::trace!("all agents terminated");
        }

        let agents = &self.possible_agents;
        let mask = AgentMask::from_table(&flat, agents);
        Ok(MultiAgentStepResult {
            observations: pad_agent_data(&flat, agents, &self.pad_observation),
            rewards: pad_agent_data(&raw.rewards, agents, &0.0),
            terminated: pad_agent_data(&raw.terminated, agents, &false),
            truncated: pad_agent_data(&raw.truncated, agents, &false),
            infos: mask.annotate(&raw.infos),
            mask,
        })
    }

    pub fn render(&self) -> Option<String> {
        self.env.render()
    }

    pub fn close(&mut self) {
        self.env.close()
    }
}
