//! MultiDiscrete action/observation space

use super::{DType, Space, TypedArray};
use ndarray::Array1;
use rand::Rng;

/// MultiDiscrete space for multiple discrete action dimensions
///
/// Each dimension i has nvec[i] possible values: {0, 1, ..., nvec[i]-1}
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MultiDiscrete {
    /// Number of values for each dimension
    pub nvec: Vec<usize>,
    /// Index type of samples
    dtype: DType,
    /// Cached shape (just the length of nvec)
    shape: Vec<usize>,
}

impl MultiDiscrete {
    /// Create a new multi-discrete space with `i64` indices
    pub fn new(nvec: Vec<usize>) -> Self {
        assert!(nvec.iter().all(|&n| n > 0), "All dimensions must have at least 1 element");
        let shape = vec![nvec.len()];
        Self {
            nvec,
            dtype: DType::I64,
            shape,
        }
    }

    /// Create from a slice
    pub fn from_slice(nvec: &[usize]) -> Self {
        Self::new(nvec.to_vec())
    }

    /// Use a different integer index type
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        assert!(dtype.is_integer(), "MultiDiscrete index type must be an integer");
        assert!(
            self.nvec.iter().all(|&n| (n - 1) as f64 <= dtype.bounds().1),
            "MultiDiscrete{:?} does not fit index type {}",
            self.nvec,
            dtype
        );
        self.dtype = dtype;
        self
    }

    /// Get the number of dimensions
    pub fn ndim(&self) -> usize {
        self.nvec.len()
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
}

impl Space for MultiDiscrete {
    type Sample = TypedArray;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        let values: Array1<f64> = self.nvec.iter().map(|&n| rng.gen_range(0..n) as f64).collect();
        TypedArray::from_f64_array(self.dtype, &values.into_dyn())
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.dtype() != self.dtype || value.shape() != self.shape.as_slice() {
            return false;
        }
        match value.integer_values() {
            Some(values) => values
                .iter()
                .zip(self.nvec.iter())
                .all(|(&v, &n)| v >= 0 && v < n as i128),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn indices(values: &[i64]) -> TypedArray {
        TypedArray::from_vec(&[values.len()], values.to_vec()).unwrap()
    }

    #[test]
    fn test_multi_discrete_sample() {
        let space = MultiDiscrete::new(vec![3, 4, 5]);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let sample = space.sample(&mut rng);
            assert!(space.contains(&sample));
            assert_eq!(sample.len(), 3);
        }
    }

    #[test]
    fn test_multi_discrete_contains() {
        let space = MultiDiscrete::new(vec![3, 4]);
        assert!(space.contains(&indices(&[0, 0])));
        assert!(space.contains(&indices(&[2, 3])));
        assert!(!space.contains(&indices(&[3, 0]))); // First dim out of range
        assert!(!space.contains(&indices(&[0, 4]))); // Second dim out of range
        assert!(!space.contains(&indices(&[0]))); // Wrong length
    }

    #[test]
    fn test_multi_discrete_properties() {
        let space = MultiDiscrete::new(vec![2, 2, 2]).with_dtype(DType::I32);
        assert_eq!(space.ndim(), 3);
        assert_eq!(space.shape(), &[3]);
        assert_eq!(space.dtype(), DType::I32);
    }

    #[test]
    #[should_panic(expected = "does not fit")]
    fn test_multi_discrete_arity_must_fit_index_type() {
        let _ = MultiDiscrete::new(vec![4, 200]).with_dtype(DType::I8);
    }
}
