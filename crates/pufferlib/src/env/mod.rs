//! Environment traits and emulation wrappers.
//!
//! Provides the flat `PufferEnv` trait consumed by learners, the raw traits
//! implemented by structured environments, and the wrappers that translate
//! between the two.

mod agents;
mod check;
mod config;
mod emulation;
mod gym;
mod make;
mod pettingzoo;
mod traits;

pub use agents::{pad_agent_data, AgentId, AgentMask, AgentTable};
pub use check::{check_array, check_space, SpaceCheck};
pub use config::EmulationConfig;
pub use emulation::{emulate_action_space, emulate_observation_space, EmulatedSpace};
pub use gym::{EpisodeState, GymnasiumEmulation};
pub use make::make_env;
pub use pettingzoo::MultiAgentEmulation;
pub use traits::{
    Action, EnvInfo, MultiAgentStepResult, Observation, PufferEnv, RawMultiAgentEnv,
    RawMultiAgentStep, RawPufferEnv, RawStepResult, StepResult,
};
