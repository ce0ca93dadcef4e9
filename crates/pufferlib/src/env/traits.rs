//! Core environment trait definitions.

use super::{AgentId, AgentMask, AgentTable};
use crate::spaces::{DynSpace, Sample, TypedArray};
use crate::Result;

/// Information returned from environment steps
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvInfo {
    /// Episode return (if done)
    pub episode_return: Option<f32>,
    /// Episode length (if done)
    pub episode_length: Option<f32>,
    /// Whether the agent was present this step (multi-agent only)
    pub mask: Option<bool>,
    /// Custom metrics (kept minimal for performance)
    pub extra: smallvec::SmallVec<[(&'static str, f32); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Add episode stats
    pub fn with_episode_stats(mut self, ret: f32, len: u32) -> Self {
        self.episode_return = Some(ret);
        self.episode_length = Some(len as f32);
        self
    }

    /// Record agent presence
    pub fn with_mask(mut self, present: bool) -> Self {
        self.mask = Some(present);
        self
    }

    /// Add a custom metric (use rarely)
    pub fn with_extra(mut self, key: &'static str, value: f32) -> Self {
        self.extra.push((key, value));
        self
    }

    /// Get a value by key (including defaults)
    pub fn get(&self, key: &str) -> Option<f32> {
        match key {
            "episode_return" => self.episode_return,
            "episode_length" => self.episode_length,
            "mask" => self.mask.map(|m| if m { 1.0 } else { 0.0 }),
            _ => self.extra.iter().find(|(k, _)| k == &key).map(|(_, v)| *v),
        }
    }
}

/// Structured observation for complex spaces
pub type Observation = Sample;

/// Structured action for complex spaces
pub type Action = Sample;

/// Result from a single emulated environment step
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Flat observation after the step
    pub observation: TypedArray,
    /// Reward received
    pub reward: f32,
    /// Whether episode terminated (goal reached, failure, etc.)
    pub terminated: bool,
    /// Whether episode truncated (time limit, etc.)
    pub truncated: bool,
    /// Additional info
    pub info: EnvInfo,
}

impl StepResult {
    /// Check if episode is done (terminated or truncated)
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Result from a raw environment step (unflattened)
#[derive(Clone, Debug)]
pub struct RawStepResult {
    /// Structured observation
    pub observation: Observation,
    /// Reward received
    pub reward: f32,
    /// Whether episode terminated
    pub terminated: bool,
    /// Whether episode truncated
    pub truncated: bool,
    /// Additional info
    pub info: EnvInfo,
}

/// Result from a raw multi-agent step, keyed by the agents that acted
#[derive(Clone, Debug, Default)]
pub struct RawMultiAgentStep {
    pub observations: AgentTable<Observation>,
    pub rewards: AgentTable<f32>,
    pub terminated: AgentTable<bool>,
    pub truncated: AgentTable<bool>,
    pub infos: AgentTable<EnvInfo>,
}

/// Result from an emulated multi-agent step.
///
/// Every table has exactly one entry per possible agent, in order.
#[derive(Clone, Debug)]
pub struct MultiAgentStepResult {
    /// Flat observations, zeroed for absent agents
    pub observations: AgentTable<TypedArray>,
    /// Rewards, 0 for absent agents
    pub rewards: AgentTable<f32>,
    /// Termination flags, false for absent agents
    pub terminated: AgentTable<bool>,
    /// Truncation flags, false for absent agents
    pub truncated: AgentTable<bool>,
    /// Infos with `mask` set for every agent
    pub infos: AgentTable<EnvInfo>,
    /// Which agents reported an observation this step
    pub mask: AgentMask,
}

/// Core trait for flat PufferLib environments.
///
/// This is what a training loop consumes: fixed, flat observation and
/// action spaces. Structured environments get it through
/// [`GymnasiumEmulation`](super::GymnasiumEmulation).
pub trait PufferEnv: Send {
    /// Get the flat observation space
    fn observation_space(&self) -> &DynSpace;

    /// Get the flat action space
    fn action_space(&self) -> &DynSpace;

    /// Reset the environment to initial state
    ///
    /// # Arguments
    /// * `seed` - Optional random seed for reproducibility
    ///
    /// # Returns
    /// Tuple of (initial flat observation, info)
    fn reset(&mut self, seed: Option<u64>) -> Result<(TypedArray, EnvInfo)>;

    /// Take a single step in the environment
    ///
    /// # Arguments
    /// * `action` - Flat action to execute
    fn step(&mut self, action: &TypedArray) -> Result<StepResult>;

    /// Optional: Render the environment
    fn render(&self) -> Option<String> {
        None
    }

    /// Optional: Close the environment and free resources
    fn close(&mut self) {}

    /// Check if environment is done and needs reset
    fn is_done(&self) -> bool {
        false
    }
}

/// Trait for single-agent environments that return structured data.
///
/// The `GymnasiumEmulation` wraps these to provide the standard
/// `PufferEnv` interface.
pub trait RawPufferEnv: Send {
    /// Get the native observation space
    fn observation_space(&self) -> DynSpace;

    /// Get the native action space
    fn action_space(&self) -> DynSpace;

    /// Reset the environment
    fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, EnvInfo)>;

    /// Take a structured step
    fn step(&mut self, action: &Action) -> Result<RawStepResult>;

    /// Whether `reset` honours a seed. When false, seeded resets fall
    /// back to unseeded ones with a warning.
    fn supports_seeding(&self) -> bool {
        true
    }

    /// Optional: Render the environment
    fn render(&self) -> Option<String> {
        None
    }

    /// Optional: Close the environment
    fn close(&mut self) {}
}

/// Trait for multi-agent environments keyed by agent name
/// (PettingZoo parallel API).
pub trait RawMultiAgentEnv: Send {
    /// Every agent that can ever appear, in a fixed order
    fn possible_agents(&self) -> Vec<AgentId>;

    /// Agents currently active
    fn agents(&self) -> Vec<AgentId>;

    /// Native observation space of one agent
    fn observation_space(&self, agent: &str) -> DynSpace;

    /// Native action space of one agent
    fn action_space(&self, agent: &str) -> DynSpace;

    /// Reset the environment
    fn reset(
        &mut self,
        seed: Option<u64>,
    ) -> Result<(AgentTable<Observation>, AgentTable<EnvInfo>)>;

    /// Take a structured step for the given agents
    fn step(&mut self, actions: &AgentTable<Action>) -> Result<RawMultiAgentStep>;

    fn supports_seeding(&self) -> bool {
        true
    }

    fn render(&self) -> Option<String> {
        None
    }

    fn close(&mut self) {}
}
