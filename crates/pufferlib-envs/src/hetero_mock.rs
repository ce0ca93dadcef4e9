//! Mock environment with heterogeneous leaf types for testing the
//! byte fallback of the emulation layer.

use pufferlib::env::{Action, EnvInfo, Observation, RawPufferEnv, RawStepResult};
use pufferlib::spaces::{Box as BoxSpace, DType, Dict, Discrete, DynSpace, MultiDiscrete, Sample};
use pufferlib::{PufferError, Result};

/// A grid world whose observation mixes `u8`, `i32`, `f32` and `i64`
/// leaves, so it can only be emulated as raw bytes.
///
/// Observation: `{grid: u8[3, 3], hp: i32, energy: f32, status: Discrete(4)}`
/// Action: `{move: Discrete(4), target: MultiDiscrete([3, 3])}`
///
/// Resets are deterministic and ignore seeds.
pub struct HeteroMock {
    pub tick: u32,
    max_ticks: u32,
    hp: i32,
    target: (usize, usize),
    /// Last native action received, kept for inspection
    pub last_action: Option<Action>,
}

impl HeteroMock {
    pub fn new(max_ticks: u32) -> Self {
        Self {
            tick: 0,
            max_ticks,
            hp: 100,
            target: (1, 1),
            last_action: None,
        }
    }

    fn observe(&self) -> Result<Observation> {
        let mut grid = vec![0u8; 9];
        grid[self.target.0 * 3 + self.target.1] = 255;
        Ok(Sample::dict([
            ("grid", Sample::array(&[3, 3], grid)?),
            ("hp", Sample::scalar(self.hp)),
            ("energy", Sample::scalar(1.0 - self.tick as f32 / self.max_ticks.max(1) as f32)),
            ("status", Sample::scalar((self.tick % 4) as i64)),
        ]))
    }
}

impl Default for HeteroMock {
    fn default() -> Self {
        Self::new(8)
    }
}

impl RawPufferEnv for HeteroMock {
    fn observation_space(&self) -> DynSpace {
        Dict::from_pairs(vec![
            ("grid", BoxSpace::full_range(&[3, 3], DType::U8).into()),
            ("hp", BoxSpace::uniform(&[], 0.0, 100.0).with_dtype(DType::I32).into()),
            ("energy", BoxSpace::unit(&[]).into()),
            ("status", Discrete::new(4).into()),
        ])
        .into()
    }

    fn action_space(&self) -> DynSpace {
        Dict::from_pairs(vec![
            ("move", Discrete::new(4).into()),
            ("target", MultiDiscrete::new(vec![3, 3]).into()),
        ])
        .into()
    }

    fn reset(&mut self, _seed: Option<u64>) -> Result<(Observation, EnvInfo)> {
        self.tick = 0;
        self.hp = 100;
        self.target = (1, 1);
        self.last_action = None;
        Ok((self.observe()?, EnvInfo::new()))
    }

    fn step(&mut self, action: &Action) -> Result<RawStepResult> {
        let target = match action {
            Sample::Dict(fields) => fields
                .get("target")
                .and_then(Sample::as_array)
                .and_then(|a| a.integer_values()),
            _ => None,
        };
        let target = target.ok_or_else(|| {
            PufferError::EnvError("action is missing an integer `target` field".to_string())
        })?;
        if let &[row, col] = target.as_slice() {
            self.target = (row.clamp(0, 2) as usize, col.clamp(0, 2) as usize);
        }

        self.last_action = Some(action.clone());
        self.tick = (self.tick + 1).min(self.max_ticks);
        self.hp = (self.hp - 10).max(0);

        let terminated = self.hp == 0;
        let truncated = self.tick >= self.max_ticks;
        Ok(RawStepResult {
            observation: self.observe()?,
            reward: if self.target == (1, 1) { 1.0 } else { 0.0 },
            terminated,
            truncated,
            info: EnvInfo::new().with_extra("hp", self.hp as f32),
        })
    }

    fn supports_seeding(&self) -> bool {
        false
    }
}
