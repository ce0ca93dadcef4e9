//! Single-agent emulation wrapper for Gymnasium-like environments.

use super::check::{check_array, SpaceCheck};
use super::make::{make_env, resolve_seed};
use super::{
    emulate_action_space, emulate_observation_space, EmulatedSpace, EmulationConfig, EnvInfo,
    PufferEnv, RawPufferEnv, StepResult,
};
use crate::spaces::{DynSpace, TypedArray};
use crate::{PufferError, Result};

/// Lifecycle of a wrapped episode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    /// `reset` has never been called
    Unstarted,
    Running,
    /// The last step ended the episode; `reset` is required
    Done,
}

/// Wrapper to convert any `RawPufferEnv` into a flat `PufferEnv`
pub struct GymnasiumEmulation<E: RawPufferEnv> {
    env: E,
    config: EmulationConfig,
    observation: EmulatedSpace,
    action: EmulatedSpace,
    state: EpisodeState,
    observation_check: SpaceCheck,
    action_check: SpaceCheck,
}

impl<E: RawPufferEnv> GymnasiumEmulation<E> {
    pub fn new(env: E) -> Result<Self> {
        Self::with_config(env, EmulationConfig::default())
    }

    pub fn with_config(env: E, config: EmulationConfig) -> Result<Self> {
        let observation = emulate_observation_space(&env.observation_space())?;
        let action = emulate_action_space(&env.action_space())?;
        tracing::debug!(
            observation_len = observation.flat_len(),
            action_len = action.flat_len(),
            "wrapped single-agent environment"
        );
        Ok(Self {
            env,
            config,
            observation,
            action,
            state: EpisodeState::Unstarted,
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

    pub fn state(&self) -> EpisodeState {
        self.state
    }

    pub fn config(&self) -> &EmulationConfig {
        &self.config
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

    pub fn into_inner(self) -> E {
        self.env
    }
}

impl<E: RawPufferEnv> PufferEnv for GymnasiumEmulation<E> {
    fn observation_space(&self) -> &DynSpace {
        self.observation.flat_space()
    }

    fn action_space(&self) -> &DynSpace {
        self.action.flat_space()
    }

    fn reset(&mut self, seed: Option<u64>) -> Result<(TypedArray, EnvInfo)> {
        let seed = resolve_seed(seed, self.env.supports_seeding());
        let (ob, info) = self.env.reset(seed)?;
        self.state = EpisodeState::Running;

        let flat = self.observation.emulate(&ob)?;
        if self.config.check_spaces {
            let space = self.observation.flat_space();
            self.observation_check.run(|| check_array(&flat, space))?;
        }
        Ok((flat, info))
    }

    fn step(&mut self, action: &TypedArray) -> Result<StepResult> {
        match self.state {
            EpisodeState::Unstarted => {
                return Err(PufferError::ApiUsage(
                    "step() called before reset()".to_string(),
                ))
            }
            EpisodeState::Done => {
                return Err(PufferError::ApiUsage(
                    "step() called after environment is done".to_string(),
                ))
            }
            EpisodeState::Running => {}
        }

        if self.config.check_spaces {
            let space = self.action.flat_space();
            self.action_check.run(|| check_array(action, space))?;
        }

        let native = self.action.nativize(action)?;
        let res = self.env.step(&native)?;
        let observation = self.observation.emulate(&res.observation)?;

        if res.terminated || (self.config.done_on_truncation && res.truncated) {
            tracing::trace!(
                terminated = res.terminated,
                truncated = res.truncated,
                "episode ended"
            );
            self.state = EpisodeState::Done;
        }

        Ok(StepResult {
            observation,
            reward: res.reward,
            terminated: res.terminated,
            truncated: res.truncated,
            info: res.info,
        })
    }

    fn render(&self) -> Option<String> {
        self.env.render()
    }

    fn close(&mut self) {
        self.env.close()
    }

    fn is_done(&self) -> bool {
        self.state == EpisodeState::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Action, Observation, RawStepResult};
    use crate::spaces::{Box, DType, Dict, Discrete, Sample, Tuple};

    /// Counts down from `horizon`, echoing the last action into the
    /// observation
    struct Countdown {
        horizon: i32,
        left: i32,
        steps: usize,
        last_seed: Option<u64>,
        seedable: bool,
    }

    impl Countdown {
        fn new(horizon: i32) -> Self {
            Self {
                horizon,
                left: horizon,
                steps: 0,
                last_seed: None,
                seedable: true,
            }
        }

        fn observe(&self, last: i64) -> Observation {
            Sample::dict([
                ("left", Sample::scalar(self.left)),
                ("last", Sample::scalar(last as i32)),
            ])
        }
    }

    impl RawPufferEnv for Countdown {
        fn observation_space(&self) -> DynSpace {
            Dict::from_pairs(vec![
                ("left", Box::uniform(&[], 0.0, 100.0).with_dtype(DType::I32).into()),
                ("last", Box::uniform(&[], 0.0, 5.0).with_dtype(DType::I32).into()),
            ])
            .into()
        }

        fn action_space(&self) -> DynSpace {
            Tuple::new(vec![Discrete::new(3).into(), Discrete::new(2).into()]).into()
        }

        fn reset(&mut self, seed: Option<u64>) -> Result<(Observation, EnvInfo)> {
            self.last_seed = seed;
            self.left = self.horizon;
            Ok((self.observe(0), EnvInfo::new()))
        }

        fn step(&mut self, action: &Action) -> Result<RawStepResult> {
            self.steps += 1;
            self.left -= 1;
            let first = match action {
                Sample::Tuple(items) => items[0]
                    .as_array()
                    .and_then(|a| a.integer_values())
                    .map_or(0, |v| v[0] as i64),
                _ => 0,
            };
            Ok(RawStepResult {
                observation: self.observe(first),
                reward: 1.0,
                terminated: self.left == 0,
                truncated: false,
                info: EnvInfo::new(),
            })
        }

        fn supports_seeding(&self) -> bool {
            self.seedable
        }
    }

    fn action(a: i64, b: i64) -> TypedArray {
        TypedArray::from_vec(&[2], vec![a, b]).unwrap()
    }

    #[test]
    fn test_flat_spaces() {
        let env = GymnasiumEmulation::new(Countdown::new(3)).unwrap();
        assert_eq!(env.emulated_observation().flat_dtype(), DType::I32);
        assert_eq!(env.observation_space().shape(), Some(&[2usize][..]));
        match env.action_space() {
            DynSpace::MultiDiscrete(md) => assert_eq!(md.nvec, vec![3, 2]),
            other => panic!("expected multi_discrete, got {}", other.kind()),
        }
    }

    #[test]
    fn test_step_before_reset_is_rejected() {
        let mut env = GymnasiumEmulation::new(Countdown::new(3)).unwrap();
        let err = env.step(&action(0, 0)).unwrap_err();
        assert!(matches!(err, PufferError::ApiUsage(_)));
        assert_eq!(env.state(), EpisodeState::Unstarted);
        assert_eq!(env.inner().steps, 0);
        assert_eq!(env.checks_passed(), (false, false));
    }

    #[test]
    fn test_episode_lifecycle() {
        let mut env = GymnasiumEmulation::new(Countdown::new(2)).unwrap();
        let (ob, _) = env.reset(Some(1)).unwrap();
        assert_eq!(ob, TypedArray::from_vec(&[2], vec![2i32, 0]).unwrap());
        assert_eq!(env.checks_passed(), (true, false));

        let res = env.step(&action(2, 1)).unwrap();
        assert_eq!(res.observation, TypedArray::from_vec(&[2], vec![1i32, 2]).unwrap());
        assert!(!res.done());
        assert_eq!(env.checks_passed(), (true, true));

        let res = env.step(&action(1, 0)).unwrap();
        assert!(res.terminated);
        assert!(env.is_done());

        match env.step(&action(0, 0)) {
            Err(PufferError::ApiUsage(msg)) => {
                assert_eq!(msg, "step() called after environment is done")
            }
            other => panic!("expected ApiUsage, got {:?}", other.map(|r| r.reward)),
        }
        assert_eq!(env.inner().steps, 2);

        env.reset(None).unwrap();
        assert_eq!(env.state(), EpisodeState::Running);
        assert!(env.step(&action(0, 0)).is_ok());
    }

    #[test]
    fn test_first_action_is_checked() {
        let mut env = GymnasiumEmulation::new(Countdown::new(5)).unwrap();
        env.reset(None).unwrap();
        let err = env.step(&action(3, 0)).unwrap_err();
        assert!(matches!(err, PufferError::ContractViolation(_)));
        assert_eq!(env.inner().steps, 0);

        env.step(&action(2, 1)).unwrap();
        // Checks are one-shot; later out-of-range actions reach the env
        env.step(&action(3, 0)).unwrap();
        assert_eq!(env.inner().steps, 2);
    }

    #[test]
    fn test_checks_can_be_disabled() {
        let config = EmulationConfig::default().with_space_checks(false);
        let mut env = GymnasiumEmulation::with_config(Countdown::new(5), config).unwrap();
        env.reset(None).unwrap();
        env.step(&action(2, 1)).unwrap();
        assert_eq!(env.checks_passed(), (false, false));
    }

    #[test]
    fn test_unseedable_env_resets_unseeded() {
        let mut raw = Countdown::new(5);
        raw.seedable = false;
        let mut env = GymnasiumEmulation::new(raw).unwrap();
        env.reset(Some(42)).unwrap();
        assert_eq!(env.inner().last_seed, None);

        let mut env = GymnasiumEmulation::new(Countdown::new(5)).unwrap();
        env.reset(Some(42)).unwrap();
        assert_eq!(env.inner().last_seed, Some(42));
    }

    #[test]
    fn test_make_with_creator() {
        let env = GymnasiumEmulation::make(
            None,
            Some(|| Countdown::new(4)),
            EmulationConfig::default(),
        )
        .unwrap();
        assert_eq!(env.inner().horizon, 4);
        assert!(GymnasiumEmulation::<Countdown>::make(
            None,
            None::<fn() -> Countdown>,
            EmulationConfig::default()
        )
        .is_err());
    }
}
