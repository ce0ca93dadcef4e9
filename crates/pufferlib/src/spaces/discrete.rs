//! Discrete action/observation space

use super::{DType, Space, TypedArray};
use rand::Rng;

/// Discrete space with n possible values: {0, 1, ..., n-1}
///
/// Samples are zero-dimensional integer arrays of the space's index type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Discrete {
    /// Number of possible values
    pub n: usize,
    /// Index type of samples
    dtype: DType,
}

impl Discrete {
    /// Create a new discrete space with n values and `i64` indices
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "Discrete space must have at least 1 element");
        Self {
            n,
            dtype: DType::I64,
        }
    }

    /// Use a different integer index type
    pub fn with_dtype(mut self, dtype: DType) -> Self {
        assert!(dtype.is_integer(), "Discrete index type must be an integer");
        assert!(
            (self.n - 1) as f64 <= dtype.bounds().1,
            "Discrete({}) does not fit index type {}",
            self.n,
            dtype
        );
        self.dtype = dtype;
        self
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Samples are scalars
    pub fn shape(&self) -> &[usize] {
        &[]
    }
}

impl Space for Discrete {
    type Sample = TypedArray;

    fn sample<R: Rng>(&self, rng: &mut R) -> Self::Sample {
        let v = rng.gen_range(0..self.n);
        TypedArray::full(self.dtype, &[], v as f64)
    }

    fn contains(&self, value: &Self::Sample) -> bool {
        if value.dtype() != self.dtype || !value.shape().is_empty() {
            return false;
        }
        match value.integer_values().as_deref() {
            Some(&[v]) => v >= 0 && v < self.n as i128,
            _ => false,
        }
    }
}
