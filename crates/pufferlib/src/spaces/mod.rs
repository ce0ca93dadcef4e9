//! Observation and action space types.
//!
//! Provides Gymnasium-compatible space definitions, typed sample values,
//! and the compiled byte layout used to pack nested samples into flat
//! buffers.

mod r#box;
mod dict;
mod discrete;
mod dtype;
mod flatten;
mod layout;
mod multi_discrete;
mod tree;
mod tuple;
mod value;

pub use dict::Dict;
pub use discrete::Discrete;
pub use dtype::DType;
pub use flatten::flatten_space;
pub use layout::{Field, Layout, PathSegment};
pub use multi_discrete::MultiDiscrete;
pub use r#box::Box;
pub use tree::SpaceTree;
pub use tuple::Tuple;
pub use value::{Element, Sample, TypedArray};

use rand::Rng;

/// Trait for observation and action spaces
pub trait Space: Clone + Send + Sync {
    /// The type of samples from this space
    type Sample;

    /// Sample a random element from this space
    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample;

    /// Check if a value is contained in this space
    fn contains(&self, value: &Self::Sample) -> bool;
}

/// Enum for dynamic space types.
///
/// `Box`, `Discrete` and `MultiDiscrete` are primitive leaves; `Tuple` and
/// `Dict` are composites.
#[derive(Clone, Debug, PartialEq)]
pub enum DynSpace {
    Discrete(Discrete),
    MultiDiscrete(MultiDiscrete),
    Box(Box),
    Tuple(Tuple),
    Dict(Dict),
}

impl DynSpace {
    /// Whether this is a primitive (non-composite) space
    pub fn is_leaf(&self) -> bool {
        !matches!(self, DynSpace::Tuple(_) | DynSpace::Dict(_))
    }

    /// Element type of a leaf, `None` for composites
    pub fn dtype(&self) -> Option<DType> {
        match self {
            DynSpace::Discrete(s) => Some(s.dtype()),
            DynSpace::MultiDiscrete(s) => Some(s.dtype()),
            DynSpace::Box(s) => Some(s.dtype()),
            DynSpace::Tuple(_) | DynSpace::Dict(_) => None,
        }
    }

    /// Sample shape of a leaf, `None` for composites
    pub fn shape(&self) -> Option<&[usize]> {
        match self {
            DynSpace::Discrete(s) => Some(s.shape()),
            DynSpace::MultiDiscrete(s) => Some(s.shape()),
            DynSpace::Box(s) => Some(s.shape()),
            DynSpace::Tuple(_) | DynSpace::Dict(_) => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            DynSpace::Discrete(_) => "discrete",
            DynSpace::MultiDiscrete(_) => "multi_discrete",
            DynSpace::Box(_) => "box",
            DynSpace::Tuple(_) => "tuple",
            DynSpace::Dict(_) => "dict",
        }
    }

    /// Sample from this space
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Sample {
        match self {
            DynSpace::Discrete(s) => Sample::Array(s.sample(rng)),
            DynSpace::MultiDiscrete(s) => Sample::Array(s.sample(rng)),
            DynSpace::Box(s) => Sample::Array(s.sample(rng)),
            DynSpace::Tuple(s) => Sample::Tuple(s.sample(rng)),
            DynSpace::Dict(s) => Sample::Dict(s.sample(rng)),
        }
    }

    /// Check if this space contains the value
    pub fn contains(&self, value: &Sample) -> bool {
        match (self, value) {
            (DynSpace::Tuple(s), Sample::Tuple(v)) => s.contains(v),
            (DynSpace::Dict(s), Sample::Dict(v)) => s.contains(v),
            (_, Sample::Array(a)) => self.contains_array(a),
            _ => false,
        }
    }

    /// Check if this leaf space contains the array. Composites never do.
    pub fn contains_array(&self, value: &TypedArray) -> bool {
        match self {
            DynSpace::Discrete(s) => s.contains(value),
            DynSpace::MultiDiscrete(s) => s.contains(value),
            DynSpace::Box(s) => s.contains(value),
            DynSpace::Tuple(_) | DynSpace::Dict(_) => false,
        }
    }

    /// Whether `value` has the same composite structure as this space:
    /// arrays at leaves, equal tuple arity and equal dict key sets.
    ///
    /// Containment can only be evaluated for samples that match.
    pub fn matches_structure(&self, value: &Sample) -> bool {
        match (self, value) {
            (DynSpace::Tuple(s), Sample::Tuple(v)) => {
                s.spaces.len() == v.len()
                    && s.spaces.iter().zip(v).all(|(s, v)| s.matches_structure(v))
            }
            (DynSpace::Dict(s), Sample::Dict(v)) => {
                s.spaces.len() == v.len()
                    && s
                        .spaces
                        .iter()
                        .all(|(k, s)| v.get(k).is_some_and(|v| s.matches_structure(v)))
            }
            (space, Sample::Array(_)) => space.is_leaf(),
            _ => false,
        }
    }
}

impl From<Discrete> for DynSpace {
    fn from(space: Discrete) -> Self {
        DynSpace::Discrete(space)
    }
}

impl From<MultiDiscrete> for DynSpace {
    fn from(space: MultiDiscrete) -> Self {
        DynSpace::MultiDiscrete(space)
    }
}

impl From<Box> for DynSpace {
    fn from(space: Box) -> Self {
        DynSpace::Box(space)
    }
}

impl From<Tuple> for DynSpace {
    fn from(space: Tuple) -> Self {
        DynSpace::Tuple(space)
    }
}

impl From<Dict> for DynSpace {
    fn from(space: Dict) -> Self {
        DynSpace::Dict(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn nested() -> DynSpace {
        Dict::from_pairs(vec![
            ("pos", Box::uniform(&[2], -1.0, 1.0).into()),
            (
                "inv",
                Tuple::new(vec![Discrete::new(3).into(), MultiDiscrete::new(vec![2, 2]).into()])
                    .into(),
            ),
        ])
        .into()
    }

    #[test]
    fn test_nested_sample_contained() {
        let space = nested();
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);
        for _ in 0..20 {
            let sample = space.sample(&mut rng);
            assert!(space.matches_structure(&sample));
            assert!(space.contains(&sample));
        }
    }

    #[test]
    fn test_structure_mismatch() {
        let space = nested();
        let flat = Sample::array(&[2], vec![0.0f32, 0.0]).unwrap();
        assert!(!space.matches_structure(&flat));
        assert!(!space.contains(&flat));

        let leaf: DynSpace = Discrete::new(2).into();
        assert!(!leaf.matches_structure(&Sample::tuple(vec![])));
        assert!(leaf.matches_structure(&Sample::scalar(9i64)));
        assert!(!leaf.contains(&Sample::scalar(9i64)));
    }

    #[test]
    fn test_leaf_accessors() {
        let space = nested();
        assert!(!space.is_leaf());
        assert_eq!(space.dtype(), None);
        assert_eq!(space.kind(), "dict");

        let leaf: DynSpace = MultiDiscrete::new(vec![4, 5]).into();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.dtype(), Some(DType::I64));
        assert_eq!(leaf.shape(), Some(&[2usize][..]));
    }
}
