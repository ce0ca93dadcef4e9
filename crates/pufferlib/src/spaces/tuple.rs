//! Tuple observation/action space

use super::{DynSpace, Sample, Space};
use rand::Rng;

/// Tuple space containing an ordered list of sub-spaces
#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    /// Ordered sub-spaces
    pub spaces: Vec<DynSpace>,
}

impl Tuple {
    /// Create a new tuple space
    pub fn new(spaces: Vec<DynSpace>) -> Self {
        Self { spaces }
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl Space for Tuple {
    type Sample = Vec<Sample>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.spaces.iter().map(|s| s.sample(rng)).collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.len() == self.spaces.len()
            && value.iter().zip(self.spaces.iter()).all(|(v, s)| s.contains(v))
    }
}
