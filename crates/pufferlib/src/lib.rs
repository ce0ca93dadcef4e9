//! # PufferLib
//!
//! Environment emulation for reinforcement learning in Rust.
//!
//! ## Overview
//!
//! Training loops want one flat, fixed-layout buffer per observation and a
//! flat vector of discrete choices per action. Environments describe their
//! data as arbitrarily nested spaces. PufferLib provides:
//! - Gymnasium-style spaces (`Box`, `Discrete`, `MultiDiscrete`, `Tuple`,
//!   `Dict`) with typed samples
//! - A layout compiler that maps a nested space to a fixed byte record
//! - Lossless pack/unpack between nested samples and flat buffers
//! - Single-agent and multi-agent emulation wrappers with one-time space
//!   checks and agent padding/masking
//!
//! ## Quick Start
//!
//! ```rust
//! use pufferlib::prelude::*;
//!
//! let space: DynSpace = Dict::from_pairs(vec![
//!     ("pos", Box::uniform(&[2], -1.0, 1.0).into()),
//!     ("hp", Box::unit(&[]).into()),
//! ])
//! .into();
//!
//! let emulated = emulate_observation_space(&space).unwrap();
//! assert_eq!(emulated.flat_dtype(), DType::F32);
//!
//! let sample = Sample::dict([
//!     ("pos", Sample::array(&[2], vec![0.5f32, -0.5]).unwrap()),
//!     ("hp", Sample::scalar(1.0f32)),
//! ]);
//! let flat = emulated.emulate(&sample).unwrap();
//! assert_eq!(flat.shape(), &[3]);
//! assert_eq!(emulated.nativize(&flat).unwrap(), sample);
//! ```

pub mod env;
pub mod spaces;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::env::{
        emulate_action_space, emulate_observation_space, pad_agent_data, AgentId, AgentMask,
        AgentTable, EmulatedSpace, EmulationConfig, EnvInfo, GymnasiumEmulation,
        MultiAgentEmulation, PufferEnv, RawMultiAgentEnv, RawPufferEnv, StepResult,
    };
    pub use crate::spaces::*;
    pub use crate::{PufferError, Result};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum PufferError {
    #[error("Environment error: {0}")]
    EnvError(String),

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// The wrapper API was used out of order
    #[error("API usage error: {0}")]
    ApiUsage(String),

    /// An agent outside the environment's possible agents was referenced
    #[error("Invalid agent {agent:?}; expected one of {expected:?}")]
    InvalidAgent {
        agent: String,
        expected: Vec<String>,
    },

    /// A sample failed its space check, or could not be checked at all
    #[error("Space contract violated: {0}")]
    ContractViolation(String),

    /// A sample disagrees with the layout it is packed into or unpacked from
    #[error("Structural mismatch at {path}: expected {expected}, got {actual}")]
    StructuralMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = core::result::Result<T, PufferError>;
