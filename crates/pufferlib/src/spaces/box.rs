//! Box (bounded array) observation/action space

use super::{DType, Space, TypedArray};
use crate::{PufferError, Result};
use ndarray::{ArrayD, IxDyn, Zip};
use rand::Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};

/// Box space: an array of a fixed element type with per-element bounds
#[derive(Clone, Debug, PartialEq)]
pub struct Box {
    /// Lower bound for each element
    pub low: ArrayD<f64>,
    /// Upper bound for each element
    pub high: ArrayD<f64>,
    /// Element type of samples
    dtype: DType,
    /// Shape of the space
    shape: Vec<usize>,
}

impl Box {
    /// Create a new box space with given bounds
    pub fn new(low: ArrayD<f64>, high: ArrayD<f64>, dtype: DType) -> Result<Self> {
        if low.shape() != high.shape() {
            return Err(PufferError::ShapeMismatch {
                expected: low.shape().to_vec(),
                actual: high.shape().to_vec(),
            });
        }
        let shape = low.shape().to_vec();
        Ok(Self {
            low,
            high,
            dtype,
            shape,
        })
    }

    /// Create an `f32` box space with uniform bounds
    pub fn uniform(shape: &[usize], low: f64, high: f64) -> Self {
        Self {
            low: ArrayD::from_elem(IxDyn(shape), low),
            high: ArrayD::from_elem(IxDyn(shape), high),
            dtype: DType::F32,
            shape: shape.to_vec(),
        }
    }

    /// Create a box space from -inf to +inf (unbounded)
    pub fn unbounded(shape: &[usize]) -> Self {
        Self::uniform(shape, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Create a unit box [0, 1] for all elements
    pub fn unit(shape: &[usize]) -> Self {
        Self::uniform(shape, 0.0, 1.0)
    }

    /// Create a symmetric box [-1, 1] for all elements
    pub fn symmetric(shape: &[usize]) -> Self {
        Self::uniform(shape, -1.0, 1.0)
    }

    /// Box covering the whole numeric domain of `dtype`
    pub fn full_range(shape: &[usize], dtype: DType) -> Self {
        let (low, high) = dtype.bounds();
        Self::uniform(shape, low, high).with_dtype(dtype)
    }

    /// Change the element type, keeping the bounds
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

fn sample_element<R: Rng>(dtype: DType, low: f64, high: f64, rng: &mut R) -> f64 {
    if dtype.is_integer() {
        let (min, max) = dtype.bounds();
        let (low, high) = (low.max(min).ceil(), high.min(max).floor());
        if low >= high {
            return low;
        }
        return rng.gen_range(low..=high).floor();
    }

    match (low.is_finite(), high.is_finite()) {
        (true, true) if low >= high => low,
        (true, true) if (high - low).is_finite() => rng.gen_range(low..=high),
        // Span overflows f64, e.g. the full range of f64
        (true, true) => {
            let (mid, half) = (low / 2.0 + high / 2.0, high / 2.0 - low / 2.0);
            mid + half * rng.gen_range(-1.0..=1.0)
        }
        (true, false) => low + Distribution::<f64>::sample(&Exp1, rng),
        (false, true) => high - Distribution::<f64>::sample(&Exp1, rng),
        (false, false) => StandardNormal.sample(rng),
    }
}

impl Space for Box {
    type Sample = TypedArray;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        let values = Zip::from(&self.low)
            .and(&self.high)
            .map_collect(|&l, &h| sample_element(self.dtype, l, h, rng));
        TypedArray::from_f64_array(self.dtype, &values)
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.dtype() != self.dtype || value.shape() != self.shape.as_slice() {
            return false;
        }
        value
            .values_f64()
            .into_iter()
            .zip(self.low.iter())
            .zip(self.high.iter())
            .all(|((v, &l), &h)| v >= l && v <= h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_box_sample() {
        let space = Box::uniform(&[3, 4], -1.0, 1.0);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng);
            assert!(space.contains(&sample));
            assert_eq!(sample.shape(), &[3, 4]);
        }
    }

    #[test]
    fn test_box_contains() {
        let space = Box::uniform(&[2], 0.0, 1.0);
        let valid = TypedArray::from_vec(&[2], vec![0.5f32, 0.5]).unwrap();
        let invalid = TypedArray::from_vec(&[2], vec![1.5f32, 0.5]).unwrap();
        let wrong_type = TypedArray::from_vec(&[2], vec![0.5f64, 0.5]).unwrap();
        let nan = TypedArray::from_vec(&[2], vec![f32::NAN, 0.5]).unwrap();

        assert!(space.contains(&valid));
        assert!(!space.contains(&invalid));
        assert!(!space.contains(&wrong_type));
        assert!(!space.contains(&nan));
    }

    #[test]
    fn test_integer_box_sample() {
        let space = Box::uniform(&[16], -3.0, 3.0).with_dtype(DType::I8);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let sample = space.sample(&mut rng);
            assert_eq!(sample.dtype(), DType::I8);
            assert!(space.contains(&sample));
        }
    }

    #[test]
    fn test_unbounded_sample_is_finite() {
        let space = Box::unbounded(&[8]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let sample = space.sample(&mut rng);
        assert!(sample.values_f64().iter().all(|v| v.is_finite()));
        assert!(space.contains(&sample));
    }

    #[test]
    fn test_full_range_and_new() {
        let space = Box::full_range(&[4], DType::U8);
        assert!(space.low.iter().all(|&v| v == 0.0));
        assert!(space.high.iter().all(|&v| v == 255.0));
        assert_eq!(space.dtype(), DType::U8);

        let low = ArrayD::from_elem(IxDyn(&[2]), 0.0);
        let high = ArrayD::from_elem(IxDyn(&[3]), 1.0);
        assert!(Box::new(low, high, DType::F32).is_err());
    }
}
