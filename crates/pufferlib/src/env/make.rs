//! Environment construction and seeding helpers.

use crate::{PufferError, Result};

/// Resolve an environment from exactly one of an instance or a creator.
pub fn make_env<E, F>(env: Option<E>, creator: Option<F>) -> Result<E>
where
    F: FnOnce() -> E,
{
    match (env, creator) {
        (Some(env), None) => Ok(env),
        (None, Some(creator)) => Ok(creator()),
        (Some(_), Some(_)) => Err(PufferError::Config(
            "provide an environment or an environment creator, not both".to_string(),
        )),
        (None, None) => Err(PufferError::Config(
            "provide an environment or an environment creator".to_string(),
        )),
    }
}

/// Seed to forward to an environment's reset. Environments that cannot be
/// seeded are reset unseeded.
pub(crate) fn resolve_seed(seed: Option<u64>, supports_seeding: bool) -> Option<u64> {
    match seed {
        Some(seed) if !supports_seeding => {
            tracing::warn!(seed, "environment does not support seeding; resetting unseeded");
            None
        }
        other => other,
    }
}
