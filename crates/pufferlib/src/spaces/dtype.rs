//! Numeric element types shared by spaces, layouts and flat buffers.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Element type of a primitive space or a flat buffer.
///
/// All multi-byte values are encoded little-endian wherever bytes are
/// produced or consumed, regardless of the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl DType {
    /// Every supported element type, smallest first.
    pub const ALL: [DType; 10] = [
        DType::U8,
        DType::I8,
        DType::U16,
        DType::I16,
        DType::U32,
        DType::I32,
        DType::U64,
        DType::I64,
        DType::F32,
        DType::F64,
    ];

    /// Size of one element in bytes. Also the alignment used by layouts.
    pub const fn size(self) -> usize {
        match self {
            DType::U8 | DType::I8 => 1,
            DType::U16 | DType::I16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::U64 | DType::I64 | DType::F64 => 8,
        }
    }

    /// Whether this is an integer type (valid as a discrete index).
    pub const fn is_integer(self) -> bool {
        !matches!(self, DType::F32 | DType::F64)
    }

    /// Numeric domain limits `(min, max)` of the type.
    ///
    /// Floats report their largest finite magnitude. 64-bit integer limits
    /// are rounded to the nearest representable `f64`.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            DType::U8 => (u8::MIN as f64, u8::MAX as f64),
            DType::I8 => (i8::MIN as f64, i8::MAX as f64),
            DType::U16 => (u16::MIN as f64, u16::MAX as f64),
            DType::I16 => (i16::MIN as f64, i16::MAX as f64),
            DType::U32 => (u32::MIN as f64, u32::MAX as f64),
            DType::I32 => (i32::MIN as f64, i32::MAX as f64),
            DType::U64 => (u64::MIN as f64, u64::MAX as f64),
            DType::I64 => (i64::MIN as f64, i64::MAX as f64),
            DType::F32 => (f32::MIN as f64, f32::MAX as f64),
            DType::F64 => (f64::MIN, f64::MAX),
        }
    }

    /// Short lowercase name, e.g. `"f32"`.
    pub const fn name(self) -> &'static str {
        match self {
            DType::U8 => "u8",
            DType::I8 => "i8",
            DType::U16 => "u16",
            DType::I16 => "i16",
            DType::U32 => "u32",
            DType::I32 => "i32",
            DType::U64 => "u64",
            DType::I64 => "i64",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_rust_types() {
        assert_eq!(DType::U8.size(), core::mem::size_of::<u8>());
        assert_eq!(DType::I16.size(), core::mem::size_of::<i16>());
        assert_eq!(DType::F32.size(), core::mem::size_of::<f32>());
        assert_eq!(DType::I64.size(), core::mem::size_of::<i64>());
        assert_eq!(DType::F64.size(), core::mem::size_of::<f64>());
    }

    #[test]
    fn test_bounds() {
        assert_eq!(DType::U8.bounds(), (0.0, 255.0));
        assert_eq!(DType::I8.bounds(), (-128.0, 127.0));
        let (lo, hi) = DType::F32.bounds();
        assert_eq!(lo, -(f32::MAX as f64));
        assert_eq!(hi, f32::MAX as f64);
    }

    #[test]
    fn test_integer_types() {
        let ints: Vec<_> = DType::ALL.iter().filter(|d| d.is_integer()).collect();
        assert_eq!(ints.len(), 8);
        assert!(!DType::F64.is_integer());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DType::I32).unwrap();
        assert_eq!(json, "\"i32\"");
        let back: DType = serde_json::from_str("\"f64\"").unwrap();
        assert_eq!(back, DType::F64);
        assert_eq!(DType::U16.to_string(), "u16");
    }
}
