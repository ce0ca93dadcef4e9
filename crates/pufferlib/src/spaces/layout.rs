//! Compiled byte layout of a nested space.
//!
//! A `Layout` is a pure function of its space: compiling the same space
//! twice, in any process, yields the same fields and offsets. Packed
//! buffers are therefore only meaningful against the identical space.

use super::tree::SpaceTree;
use super::{DType, DynSpace, Sample, TypedArray};
use crate::{PufferError, Result};
use core::fmt;
use serde::{Deserialize, Serialize};

/// One step from a parent composite to a child.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSegment {
    /// Position inside a tuple
    Index(usize),
    /// Key inside a dict
    Key(String),
}

/// Render a field path as `key.sub[2]`, or `<root>` when empty.
pub(crate) fn format_path(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return "<root>".to_string();
    }
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Index(i) => out.push_str(&format!("[{}]", i)),
            PathSegment::Key(k) if out.is_empty() => out.push_str(k),
            PathSegment::Key(k) => {
                out.push('.');
                out.push_str(k);
            }
        }
    }
    out
}

/// A primitive field of the layout
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Labels from the root to this leaf
    pub path: Vec<PathSegment>,
    /// Element type
    pub dtype: DType,
    /// Array shape
    pub shape: Vec<usize>,
    /// Byte offset in the packed buffer
    pub offset: usize,
}

impl Field {
    /// Printable path, e.g. `inventory[0].count`
    pub fn name(&self) -> String {
        format_path(&self.path)
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.shape.iter().product::<usize>() * self.dtype.size()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}{:?} @{}",
            self.name(),
            self.dtype,
            self.shape,
            self.offset
        )
    }
}

/// Byte layout mirroring a space, one field per leaf.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    tree: SpaceTree,
    fields: Vec<Field>,
}

impl Layout {
    /// Compile the layout of `space`.
    pub fn compile(space: &DynSpace) -> Self {
        let tree = SpaceTree::from_space(space);
        let mut fields = Vec::new();
        collect_fields(&tree, &mut Vec::new(), &mut fields);
        Self { tree, fields }
    }

    /// Total size in bytes, including padding
    pub fn size(&self) -> usize {
        self.tree.size()
    }

    /// Alignment of the whole record
    pub fn align(&self) -> usize {
        self.tree.align()
    }

    /// Fields in traversal order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn tree(&self) -> &SpaceTree {
        &self.tree
    }

    /// Number of `dtype` elements needed to hold one packed record, if the
    /// record size is a whole multiple of the element size.
    pub fn num_elements(&self, dtype: DType) -> Option<usize> {
        (self.size() % dtype.size() == 0).then(|| self.size() / dtype.size())
    }

    /// Pack a native sample into a flat 1-D array of `dtype`.
    ///
    /// Leaves are copied without conversion, so their element types and
    /// shapes must match the layout exactly. The filled record is then
    /// viewed bitwise as `dtype`.
    pub fn pack(&self, sample: &Sample, dtype: DType) -> Result<TypedArray> {
        let numel = self.num_elements(dtype).ok_or_else(|| {
            PufferError::Config(format!(
                "layout of {} bytes is not a whole number of {} elements",
                self.size(),
                dtype
            ))
        })?;
        let mut buf = vec![0u8; self.size()];
        self.tree.pack_into(sample, &mut buf, &mut Vec::new())?;
        TypedArray::from_le_bytes(dtype, &[numel], &buf)
    }

    /// Rebuild a native sample from a flat array produced by `pack`.
    ///
    /// Any element type is accepted as long as the array holds exactly one
    /// record's worth of bytes.
    pub fn unpack(&self, flat: &TypedArray) -> Result<Sample> {
        if flat.nbytes() != self.size() {
            return Err(PufferError::StructuralMismatch {
                path: format_path(&[]),
                expected: format!("{} bytes", self.size()),
                actual: format!("{} bytes ({} x {})", flat.nbytes(), flat.len(), flat.dtype()),
            });
        }
        self.tree.unpack_from(&flat.to_le_bytes())
    }
}

fn collect_fields(tree: &SpaceTree, path: &mut Vec<PathSegment>, fields: &mut Vec<Field>) {
    match tree {
        SpaceTree::Leaf {
            dtype,
            shape,
            offset,
            ..
        } => fields.push(Field {
            path: path.clone(),
            dtype: *dtype,
            shape: shape.clone(),
            offset: *offset,
        }),
        SpaceTree::Tuple { children, .. } => {
            for (i, child) in children.iter().enumerate() {
                path.push(PathSegment::Index(i));
                collect_fields(child, path, fields);
                path.pop();
            }
        }
        SpaceTree::Dict { children, .. } => {
            for (name, child) in children {
                path.push(PathSegment::Key(name.clone()));
                collect_fields(child, path, fields);
                path.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{flatten_space, Box as BoxSpace, Dict, Discrete, Tuple};

    fn mixed() -> DynSpace {
        Dict::from_pairs(vec![
            ("a", BoxSpace::uniform(&[2], -5.0, 5.0).into()),
            ("b", BoxSpace::full_range(&[], DType::I32).into()),
        ])
        .into()
    }

    #[test]
    fn test_fields_follow_flatten_order() {
        let space: DynSpace = Tuple::new(vec![
            Dict::from_pairs(vec![("x", Discrete::new(2).into()), ("y", BoxSpace::unit(&[3]).into())])
                .into(),
            Discrete::new(7).with_dtype(DType::U8).into(),
        ])
        .into();
        let layout = Layout::compile(&space);
        let names: Vec<_> = layout.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["[0].x", "[0].y", "[1]"]);

        let leaves = flatten_space(&space);
        assert_eq!(leaves.len(), layout.fields().len());
        for (leaf, field) in leaves.iter().zip(layout.fields()) {
            assert_eq!(leaf.dtype(), Some(field.dtype));
            assert_eq!(leaf.shape(), Some(field.shape.as_slice()));
        }
    }

    #[test]
    fn test_compile_is_deterministic() {
        let a = Layout::compile(&mixed());
        let b = Layout::compile(&mixed());
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_pack_as_f32_scenario() {
        let layout = Layout::compile(&mixed());
        assert_eq!(layout.size(), 12);

        let sample = Sample::dict([
            ("a", Sample::array(&[2], vec![1.0f32, 2.0]).unwrap()),
            ("b", Sample::scalar(7i32)),
        ]);
        let flat = layout.pack(&sample, DType::F32).unwrap();
        assert_eq!(flat.shape(), &[3]);
        let values = flat.as_array::<f32>().unwrap().as_slice().unwrap();
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 2.0);
        // The i32 slot is reinterpreted, not converted
        assert_eq!(values[2].to_bits(), 7);

        assert_eq!(layout.unpack(&flat).unwrap(), sample);
    }

    #[test]
    fn test_pack_rejects_indivisible_dtype() {
        let space: DynSpace = BoxSpace::unit(&[3]).with_dtype(DType::U8).into();
        let layout = Layout::compile(&space);
        let sample = Sample::array(&[3], vec![1u8, 2, 3]).unwrap();
        assert!(matches!(
            layout.pack(&sample, DType::U16),
            Err(PufferError::Config(_))
        ));
        assert_eq!(layout.num_elements(DType::U8), Some(3));
    }

    #[test]
    fn test_unpack_rejects_wrong_size() {
        let layout = Layout::compile(&mixed());
        let short = TypedArray::zeros(DType::F32, &[2]);
        assert!(matches!(
            layout.unpack(&short),
            Err(PufferError::StructuralMismatch { .. })
        ));
    }

    #[test]
    fn test_pack_rejects_missing_and_extra_keys() {
        let layout = Layout::compile(&mixed());
        let missing = Sample::dict([("a", Sample::array(&[2], vec![1.0f32, 2.0]).unwrap())]);
        assert!(layout.pack(&missing, DType::U8).is_err());

        let extra = Sample::dict([
            ("a", Sample::array(&[2], vec![1.0f32, 2.0]).unwrap()),
            ("b", Sample::scalar(7i32)),
            ("c", Sample::scalar(7i32)),
        ]);
        let err = layout.pack(&extra, DType::U8).unwrap_err();
        assert!(err.to_string().contains("\"c\""));
    }

    #[test]
    fn test_dict_sample_order_is_irrelevant() {
        let layout = Layout::compile(&mixed());
        let forward = Sample::dict([
            ("a", Sample::array(&[2], vec![1.0f32, 2.0]).unwrap()),
            ("b", Sample::scalar(7i32)),
        ]);
        let backward = Sample::dict([
            ("b", Sample::scalar(7i32)),
            ("a", Sample::array(&[2], vec![1.0f32, 2.0]).unwrap()),
        ]);
        assert_eq!(
            layout.pack(&forward, DType::U8).unwrap(),
            layout.pack(&backward, DType::U8).unwrap()
        );
    }

    #[test]
    fn test_field_display() {
        let layout = Layout::compile(&mixed());
        assert_eq!(layout.fields()[1].to_string(), "b i32[] @8");
        assert_eq!(layout.fields()[0].size(), 8);
    }
}
