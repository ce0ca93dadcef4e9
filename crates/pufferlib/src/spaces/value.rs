//! Typed arrays and structured samples.
//!
//! `TypedArray` is the value of a primitive space: an n-dimensional array
//! tagged with its element type. `Sample` nests arrays into tuples and
//! dicts, mirroring `DynSpace`.

use super::DType;
use crate::{PufferError, Result};
use indexmap::IndexMap;
use ndarray::{ArrayD, IxDyn};

/// Rust scalar types that can live inside a [`TypedArray`].
pub trait Element: Copy + PartialEq + core::fmt::Debug + Send + Sync + 'static {
    /// Element type tag
    const DTYPE: DType;

    /// Encode into exactly `DTYPE.size()` little-endian bytes.
    fn write_le(self, out: &mut [u8]);

    /// Decode from exactly `DTYPE.size()` little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;

    /// Lossy widening used for bounds checks.
    fn to_f64(self) -> f64;

    /// Saturating conversion used when sampling.
    fn from_f64(value: f64) -> Self;

    /// Exact integer value, `None` for floats.
    fn to_i128(self) -> Option<i128>;

    /// Checked conversion from an exact integer, `None` when out of range
    /// or for floats.
    fn from_i128(value: i128) -> Option<Self>;

    /// Wrap an array of this type.
    fn wrap(array: ArrayD<Self>) -> TypedArray;

    /// Borrow the array if `value` holds this type.
    fn unwrap_ref(value: &TypedArray) -> Option<&ArrayD<Self>>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident, $integer:expr;)*) => {$(
        impl Element for $ty {
            const DTYPE: DType = DType::$variant;

            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; core::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }

            fn to_f64(self) -> f64 {
                self as f64
            }

            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_i128(self) -> Option<i128> {
                if $integer {
                    Some(self as i128)
                } else {
                    None
                }
            }

            fn from_i128(value: i128) -> Option<Self> {
                ($integer && value >= <$ty>::MIN as i128 && value <= <$ty>::MAX as i128)
                    .then(|| value as $ty)
            }

            fn wrap(array: ArrayD<Self>) -> TypedArray {
                TypedArray::$variant(array)
            }

            fn unwrap_ref(value: &TypedArray) -> Option<&ArrayD<Self>> {
                match value {
                    TypedArray::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    )*};
}

impl_element! {
    u8 => U8, true;
    i8 => I8, true;
    u16 => U16, true;
    i16 => I16, true;
    u32 => U32, true;
    i32 => I32, true;
    u64 => U64, true;
    i64 => I64, true;
    f32 => F32, false;
    f64 => F64, false;
}

/// Run `$body` with `$t` bound to the Rust type of a runtime `DType`.
macro_rules! with_dtype {
    ($dtype:expr, $t:ident => $body:expr) => {
        match $dtype {
            DType::U8 => {
                type $t = u8;
                $body
            }
            DType::I8 => {
                type $t = i8;
                $body
            }
            DType::U16 => {
                type $t = u16;
                $body
            }
            DType::I16 => {
                type $t = i16;
                $body
            }
            DType::U32 => {
                type $t = u32;
                $body
            }
            DType::I32 => {
                type $t = i32;
                $body
            }
            DType::U64 => {
                type $t = u64;
                $body
            }
            DType::I64 => {
                type $t = i64;
                $body
            }
            DType::F32 => {
                type $t = f32;
                $body
            }
            DType::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

/// Run `$body` with `$a` bound to the inner `ArrayD` of any variant.
macro_rules! dispatch {
    ($value:expr, $a:ident => $body:expr) => {
        match $value {
            TypedArray::U8($a) => $body,
            TypedArray::I8($a) => $body,
            TypedArray::U16($a) => $body,
            TypedArray::I16($a) => $body,
            TypedArray::U32($a) => $body,
            TypedArray::I32($a) => $body,
            TypedArray::U64($a) => $body,
            TypedArray::I64($a) => $body,
            TypedArray::F32($a) => $body,
            TypedArray::F64($a) => $body,
        }
    };
}

/// N-dimensional array tagged with its element type.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedArray {
    U8(ArrayD<u8>),
    I8(ArrayD<i8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
    U64(ArrayD<u64>),
    I64(ArrayD<i64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl TypedArray {
    /// Build an array from row-major data.
    pub fn from_vec<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self> {
        let actual = data.len();
        ArrayD::from_shape_vec(IxDyn(shape), data)
            .map(T::wrap)
            .map_err(|_| PufferError::ShapeMismatch {
                expected: shape.to_vec(),
                actual: vec![actual],
            })
    }

    /// Zero-dimensional array holding one value.
    pub fn scalar<T: Element>(value: T) -> Self {
        T::wrap(ArrayD::from_elem(IxDyn(&[]), value))
    }

    /// Array of the given type filled with zeros.
    pub fn zeros(dtype: DType, shape: &[usize]) -> Self {
        Self::full(dtype, shape, 0.0)
    }

    /// Array of the given type filled with `value` (cast to the type).
    pub fn full(dtype: DType, shape: &[usize], value: f64) -> Self {
        with_dtype!(dtype, T => T::wrap(ArrayD::from_elem(IxDyn(shape), T::from_f64(value))))
    }

    /// Cast every element of an `f64` array to `dtype`, keeping the shape.
    pub fn from_f64_array(dtype: DType, values: &ArrayD<f64>) -> Self {
        with_dtype!(dtype, T => T::wrap(values.mapv(T::from_f64)))
    }

    /// Build an array of `dtype` from `f64` values, casting each one.
    pub fn from_f64(dtype: DType, shape: &[usize], values: Vec<f64>) -> Result<Self> {
        with_dtype!(dtype, T => {
            let data: Vec<T> = values.into_iter().map(T::from_f64).collect();
            Self::from_vec(shape, data)
        })
    }

    /// Decode `bytes` (little-endian, row-major) into an array.
    pub fn from_le_bytes(dtype: DType, shape: &[usize], bytes: &[u8]) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if bytes.len() != numel * dtype.size() {
            return Err(PufferError::ShapeMismatch {
                expected: vec![numel * dtype.size()],
                actual: vec![bytes.len()],
            });
        }
        with_dtype!(dtype, T => {
            let data: Vec<T> = bytes.chunks_exact(dtype.size()).map(T::read_le).collect();
            Self::from_vec(shape, data)
        })
    }

    /// Element type of this array
    pub fn dtype(&self) -> DType {
        match self {
            TypedArray::U8(_) => DType::U8,
            TypedArray::I8(_) => DType::I8,
            TypedArray::U16(_) => DType::U16,
            TypedArray::I16(_) => DType::I16,
            TypedArray::U32(_) => DType::U32,
            TypedArray::I32(_) => DType::I32,
            TypedArray::U64(_) => DType::U64,
            TypedArray::I64(_) => DType::I64,
            TypedArray::F32(_) => DType::F32,
            TypedArray::F64(_) => DType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        dispatch!(self, a => a.shape())
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        dispatch!(self, a => a.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the encoded array in bytes.
    pub fn nbytes(&self) -> usize {
        self.len() * self.dtype().size()
    }

    /// Borrow the inner array if it holds `T`.
    pub fn as_array<T: Element>(&self) -> Option<&ArrayD<T>> {
        T::unwrap_ref(self)
    }

    /// Elements in row-major order, widened to `f64`.
    pub fn values_f64(&self) -> Vec<f64> {
        dispatch!(self, a => a.iter().map(|v| v.to_f64()).collect())
    }

    /// Elements in row-major order as exact integers, `None` for floats.
    pub fn integer_values(&self) -> Option<Vec<i128>> {
        dispatch!(self, a => a.iter().map(|v| v.to_i128()).collect())
    }

    /// Convert integer elements to another integer type, keeping the shape.
    ///
    /// Unlike [`TypedArray::reinterpret`] this converts values. Float
    /// elements, float targets and values outside the target range are
    /// contract violations.
    pub fn cast_integer(&self, dtype: DType) -> Result<Self> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        let values = self.integer_values().ok_or_else(|| {
            PufferError::ContractViolation(format!("{} values are not indices", self.dtype()))
        })?;
        with_dtype!(dtype, T => {
            let data = values
                .into_iter()
                .map(|v| {
                    T::from_i128(v).ok_or_else(|| {
                        PufferError::ContractViolation(format!("index {} does not fit {}", v, dtype))
                    })
                })
                .collect::<Result<Vec<T>>>()?;
            Self::from_vec(self.shape(), data)
        })
    }

    /// Write the elements, row-major and little-endian, into `out`.
    ///
    /// `out` must be exactly `self.nbytes()` long.
    pub fn write_le_bytes(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), self.nbytes());
        let size = self.dtype().size();
        dispatch!(self, a => {
            for (chunk, v) in out.chunks_exact_mut(size).zip(a.iter()) {
                v.write_le(chunk);
            }
        })
    }

    /// Encode the elements, row-major and little-endian.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.nbytes()];
        self.write_le_bytes(&mut bytes);
        bytes
    }

    /// View the encoded bytes as a 1-D array of another element type.
    ///
    /// This is a bit-level reinterpretation, not a numeric conversion.
    pub fn reinterpret(&self, dtype: DType) -> Result<Self> {
        let bytes = self.to_le_bytes();
        if bytes.len() % dtype.size() != 0 {
            return Err(PufferError::Config(format!(
                "{} bytes of {} cannot be viewed as {}",
                bytes.len(),
                self.dtype(),
                dtype
            )));
        }
        Self::from_le_bytes(dtype, &[bytes.len() / dtype.size()], &bytes)
    }
}

impl<T: Element> From<ArrayD<T>> for TypedArray {
    fn from(array: ArrayD<T>) -> Self {
        T::wrap(array)
    }
}

/// Native structured value of a space.
#[derive(Clone, Debug, PartialEq)]
pub enum Sample {
    /// Value of a primitive space
    Array(TypedArray),
    /// Positional composite
    Tuple(Vec<Sample>),
    /// Keyed composite
    Dict(IndexMap<String, Sample>),
}

impl Sample {
    pub fn scalar<T: Element>(value: T) -> Self {
        Sample::Array(TypedArray::scalar(value))
    }

    pub fn array<T: Element>(shape: &[usize], data: Vec<T>) -> Result<Self> {
        TypedArray::from_vec(shape, data).map(Sample::Array)
    }

    pub fn tuple(items: Vec<Sample>) -> Self {
        Sample::Tuple(items)
    }

    /// Build a dict sample, keeping the given key order.
    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Sample)>) -> Self {
        Sample::Dict(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Short description of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Sample::Array(_) => "array",
            Sample::Tuple(_) => "tuple",
            Sample::Dict(_) => "dict",
        }
    }

    pub fn as_array(&self) -> Option<&TypedArray> {
        match self {
            Sample::Array(a) => Some(a),
            _ => None,
        }
    }
}

impl From<TypedArray> for Sample {
    fn from(array: TypedArray) -> Self {
        Sample::Array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_encoding() {
        let arr = TypedArray::from_vec(&[2], vec![1u16, 0x0203]).unwrap();
        assert_eq!(arr.to_le_bytes(), vec![1, 0, 3, 2]);

        let back = TypedArray::from_le_bytes(DType::U16, &[2], &[1, 0, 3, 2]).unwrap();
        assert_eq!(back, arr);
    }

    #[test]
    fn test_reinterpret_is_bitwise() {
        let arr = TypedArray::from_vec(&[1], vec![1.0f32]).unwrap();
        let bytes = arr.reinterpret(DType::U8).unwrap();
        assert_eq!(bytes.as_array::<u8>().unwrap().as_slice().unwrap(), &1.0f32.to_le_bytes());

        let bits = arr.reinterpret(DType::U32).unwrap();
        assert_eq!(
            bits.as_array::<u32>().unwrap().iter().next().copied(),
            Some(1.0f32.to_bits())
        );

        let odd = TypedArray::from_vec(&[3], vec![1u8, 2, 3]).unwrap();
        assert!(odd.reinterpret(DType::U16).is_err());
    }

    #[test]
    fn test_scalar_shape() {
        let s = TypedArray::scalar(7i32);
        assert_eq!(s.shape(), &[] as &[usize]);
        assert_eq!(s.len(), 1);
        assert_eq!(s.nbytes(), 4);
        assert_eq!(s.integer_values(), Some(vec![7]));
    }

    #[test]
    fn test_from_vec_shape_mismatch() {
        let err = TypedArray::from_vec(&[2, 2], vec![1.0f64; 3]).unwrap_err();
        assert!(matches!(err, PufferError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_zeros_and_from_f64() {
        let z = TypedArray::zeros(DType::I16, &[2, 3]);
        assert_eq!(z.dtype(), DType::I16);
        assert_eq!(z.values_f64(), vec![0.0; 6]);

        let v = TypedArray::from_f64(DType::U8, &[2], vec![3.9, 300.0]).unwrap();
        // Casts truncate and saturate
        assert_eq!(v.integer_values(), Some(vec![3, 255]));
        assert_eq!(TypedArray::scalar(1.5f32).integer_values(), None);
    }

    #[test]
    fn test_cast_integer_converts_values() {
        let arr = TypedArray::from_vec(&[3], vec![0u8, 7, 255]).unwrap();
        let wide = arr.cast_integer(DType::I64).unwrap();
        assert_eq!(wide, TypedArray::from_vec(&[3], vec![0i64, 7, 255]).unwrap());
        assert_eq!(wide.cast_integer(DType::U8).unwrap(), arr);

        let too_big = TypedArray::from_vec(&[2], vec![1i64, 300]).unwrap();
        let err = too_big.cast_integer(DType::U8).unwrap_err();
        assert!(matches!(err, PufferError::ContractViolation(_)));
        assert!(TypedArray::scalar(-1i32).cast_integer(DType::U32).is_err());
        assert!(TypedArray::scalar(1.0f32).cast_integer(DType::I64).is_err());
        assert!(TypedArray::scalar(1i64).cast_integer(DType::F32).is_err());
    }

    #[test]
    fn test_sample_dict_keeps_order() {
        let s = Sample::dict([("z", Sample::scalar(1u8)), ("a", Sample::scalar(2u8))]);
        match s {
            Sample::Dict(map) => {
                let keys: Vec<_> = map.keys().cloned().collect();
                assert_eq!(keys, vec!["z", "a"]);
            }
            other => panic!("expected dict, got {}", other.kind()),
        }
    }
}
