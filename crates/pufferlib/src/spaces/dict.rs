//! Dict (dictionary) observation/action space

use super::{DynSpace, Sample, Space};
use indexmap::IndexMap;
use rand::Rng;

/// Dictionary space containing named sub-spaces.
///
/// Keys keep their insertion order, which is also the order used for
/// flattening and packing.
#[derive(Clone, Debug, PartialEq)]
pub struct Dict {
    /// Named sub-spaces
    pub spaces: IndexMap<String, DynSpace>,
}

impl Dict {
    /// Create a new dict space
    pub fn new(spaces: IndexMap<String, DynSpace>) -> Self {
        Self { spaces }
    }

    /// Create from a list of (name, space) pairs, keeping their order
    pub fn from_pairs(pairs: Vec<(&str, DynSpace)>) -> Self {
        let spaces = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        Self::new(spaces)
    }

    /// Get a sub-space by name
    pub fn get(&self, name: &str) -> Option<&DynSpace> {
        self.spaces.get(name)
    }

    /// Get all space names in order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.spaces.keys()
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl Space for Dict {
    type Sample = IndexMap<String, Sample>;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        self.spaces
            .iter()
            .map(|(k, v)| (k.clone(), v.sample(rng)))
            .collect()
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        value.len() == self.spaces.len()
            && self
                .spaces
                .iter()
                .all(|(k, s)| value.get(k).is_some_and(|v| s.contains(v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{Box as BoxSpace, Discrete};
    use rand::SeedableRng;

    #[test]
    fn test_dict_creation() {
        let dict = Dict::from_pairs(vec![
            ("position", DynSpace::Box(BoxSpace::uniform(&[3], -1.0, 1.0))),
            ("action", DynSpace::Discrete(Discrete::new(4))),
        ]);

        assert!(dict.get("position").is_some());
        assert!(dict.get("action").is_some());
        assert!(dict.get("unknown").is_none());
        let keys: Vec<_> = dict.keys().cloned().collect();
        assert_eq!(keys, vec!["position", "action"]);
    }

    #[test]
    fn test_dict_contains() {
        let dict = Dict::from_pairs(vec![
            ("a", DynSpace::Discrete(Discrete::new(2))),
            ("b", DynSpace::Box(BoxSpace::unit(&[1]))),
        ]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let mut sample = dict.sample(&mut rng);
        assert!(dict.contains(&sample));

        sample.shift_remove("b");
        assert!(!dict.contains(&sample));
        sample.insert("c".to_string(), Sample::scalar(0i64));
        assert!(!dict.contains(&sample));
    }
}
