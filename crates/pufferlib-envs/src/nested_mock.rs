//! Point mass with a nested, homogeneous observation.

use pufferlib::env::{Action, EnvInfo, Observation, RawPufferEnv, RawStepResult};
use pufferlib::spaces::{Box as BoxSpace, Dict, Discrete, DynSpace, Sample, Tuple};
use pufferlib::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A point mass pushed around a bounded plane.
///
/// Observation: `{position: f32[2], velocity: f32[2], sensors: (f32[3], f32)}`
/// Action: `(axis: Discrete(3), thrust: Discrete(5))`
pub struct NestedMock {
    position: [f32; 2],
    velocity: [f32; 2],
    steps: u32,
    max_steps: u32,
    rng: StdRng,
}

impl NestedMock {
    const BOUND: f32 = 10.0;

    pub fn new(max_steps: u32) -> Self {
        Self {
            position: [0.0; 2],
            velocity: [0.0; 2],
            steps: 0,
            max_steps,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn position(&self) -> [f32; 2] {
        self.position
    }

    fn observe(&mut self) -> Result<Observation> {
        let noise: Vec<f32> = (0..3).map(|_| self.rng.gen_range(0.0..=1.0)).collect();
        let distance = (self.position[0].powi(2) + self.position[1].powi(2)).sqrt();
        Ok(Sample::dict([
            ("position", Sample::array(&[2], self.position.to_vec())?),
            ("velocity", Sample::array(&[2], self.velocity.to_vec())?),
            (
                "sensors",
                Sample::tuple(vec![
                    Sample::array(&[3], noise)?,
                    Sample::scalar(distance.min(100.0)),
                ]),
            ),
        ]))
    }
}

impl Default for NestedMock {
    fn default() -> Self {
        Self::new(100)
    }
}

fn index(sample: &Sample) -> Option<i128> {
    sample.as_array()?.integer_values()?.first().copied()
}

impl RawPufferEnv for NestedMock {
    fn observation_space(&self) -> DynSpace {
        Dict::from_pairs(vec![
            ("position", BoxSpace::uniform(&[2], -Self::BOUND as f64, Self::BOUND as f64).into()),
            ("velocity", BoxSpace::symmetric(&[2]).into()),
            (
                "sensors",
                Tuple::new(vec![
                    BoxSpace::unit(&[3]).into(),
                    BoxSpace::uniform(&[], 0.0, 100.0).into(),
                ])
                .into(),
            ),
        ])
        .into()
    }

    fn action_space(&self) -> DynSpace {
        Tuple::new(vec![Discrete::new(3).into(), Discrete::new(5).into()]).into()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, EnvInfo)> {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.position = [0.0; 2];
        self.velocity = [self.rng.gen_range(-1.0..=1.0), self.rng.gen_range(-1.0..=1.0)];
        self.steps = 0;
        Ok((self.observe()?, EnvInfo::new()))
    }

    fn step(&mut self, action: &Action) -> Result<RawStepResult> {
        let (axis, thrust) = match action {
            Sample::Tuple(items) if items.len() == 2 => (
                index(&items[0]).unwrap_or(0),
                index(&items[1]).unwrap_or(2),
            ),
            other => {
                return Err(pufferlib::PufferError::EnvError(format!(
                    "expected a 2-tuple action, got {}",
                    other.kind()
                )))
            }
        };

        // axis 2 coasts; thrust 0..=4 maps to -1.0..=1.0
        let force = (thrust as f32 - 2.0) * 0.5;
        if let Some(v) = self.velocity.get_mut(axis as usize) {
            *v = (*v + force * 0.25).clamp(-1.0, 1.0);
        }
        for (p, v) in self.position.iter_mut().zip(self.velocity) {
            *p = (*p + v).clamp(-Self::BOUND, Self::BOUND);
        }
        self.steps += 1;

        let terminated = self.position.iter().any(|p| p.abs() >= Self::BOUND);
        let truncated = self.steps >= self.max_steps;
        let reward = -self.position.iter().map(|p| p.abs()).sum::<f32>() / Self::BOUND;

        let mut info = EnvInfo::new();
        if terminated || truncated {
            info = info.with_episode_stats(reward, self.steps);
        }
        Ok(RawStepResult {
            observation: self.observe()?,
            reward,
            terminated,
            truncated,
            info,
        })
    }

    fn render(&self) -> Option<String> {
        Some(format!(
            "pos=({:.2}, {:.2}) vel=({:.2}, {:.2})",
            self.position[0], self.position[1], self.velocity[0], self.velocity[1]
        ))
    }
}
