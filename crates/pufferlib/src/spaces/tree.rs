//! Space metadata for recursive packing/unpacking.
//!
//! Byte offsets follow one fixed rule on every platform:
//! - a leaf is aligned to its element size and occupies
//!   `product(shape) * element size` bytes;
//! - a composite is aligned to the largest alignment of its children
//!   (1 when empty) and its size is rounded up to that alignment;
//! - children are placed in traversal order, each at the next offset that
//!   is a multiple of its alignment.

use super::layout::{format_path, PathSegment};
use super::{DType, DynSpace, Sample, TypedArray};
use crate::{PufferError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Tree structure representing the byte layout of a nested space
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpaceTree {
    /// Leaf node representing a primitive space (Box, Discrete, etc.)
    Leaf {
        /// Element type stored in this field
        dtype: DType,
        /// Shape of the stored array
        shape: Vec<usize>,
        /// Byte offset in the packed buffer
        offset: usize,
        /// Size in bytes
        size: usize,
    },
    /// Branch node representing an ordered collection (Tuple)
    Tuple {
        /// Ordered sub-trees
        children: Vec<SpaceTree>,
        /// Byte offset of the first byte of this branch
        offset: usize,
        /// Size in bytes, including trailing padding
        size: usize,
        /// Alignment of this branch
        align: usize,
    },
    /// Branch node representing a named collection (Dict)
    Dict {
        /// Named sub-trees in key insertion order
        children: Vec<(String, SpaceTree)>,
        /// Byte offset of the first byte of this branch
        offset: usize,
        /// Size in bytes, including trailing padding
        size: usize,
        /// Alignment of this branch
        align: usize,
    },
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

fn alignment(space: &DynSpace) -> usize {
    match space {
        DynSpace::Box(s) => s.dtype().size(),
        DynSpace::Discrete(s) => s.dtype().size(),
        DynSpace::MultiDiscrete(s) => s.dtype().size(),
        DynSpace::Tuple(s) => s.spaces.iter().map(alignment).max().unwrap_or(1),
        DynSpace::Dict(s) => s.spaces.values().map(alignment).max().unwrap_or(1),
    }
}

fn mismatch(
    path: &[PathSegment],
    expected: impl Into<String>,
    actual: impl Into<String>,
) -> PufferError {
    PufferError::StructuralMismatch {
        path: format_path(path),
        expected: expected.into(),
        actual: actual.into(),
    }
}

impl SpaceTree {
    /// Create a SpaceTree from a DynSpace, rooted at offset 0
    pub fn from_space(space: &DynSpace) -> Self {
        Self::build(space, 0)
    }

    fn build(space: &DynSpace, offset: usize) -> Self {
        match space {
            DynSpace::Box(s) => Self::leaf(s.dtype(), s.shape(), offset),
            DynSpace::Discrete(s) => Self::leaf(s.dtype(), s.shape(), offset),
            DynSpace::MultiDiscrete(s) => Self::leaf(s.dtype(), s.shape(), offset),
            DynSpace::Tuple(s) => {
                let align = alignment(space);
                let mut cursor = offset;
                let children = s
                    .spaces
                    .iter()
                    .map(|child| {
                        cursor = align_up(cursor, alignment(child));
                        let tree = SpaceTree::build(child, cursor);
                        cursor += tree.size();
                        tree
                    })
                    .collect();

                SpaceTree::Tuple {
                    children,
                    offset,
                    size: align_up(cursor - offset, align),
                    align,
                }
            }
            DynSpace::Dict(s) => {
                let align = alignment(space);
                let mut cursor = offset;
                let children = s
                    .spaces
                    .iter()
                    .map(|(name, child)| {
                        cursor = align_up(cursor, alignment(child));
                        let tree = SpaceTree::build(child, cursor);
                        cursor += tree.size();
                        (name.clone(), tree)
                    })
                    .collect();

                SpaceTree::Dict {
                    children,
                    offset,
                    size: align_up(cursor - offset, align),
                    align,
                }
            }
        }
    }

    fn leaf(dtype: DType, shape: &[usize], offset: usize) -> Self {
        SpaceTree::Leaf {
            dtype,
            shape: shape.to_vec(),
            offset,
            size: shape.iter().product::<usize>() * dtype.size(),
        }
    }

    /// Size in bytes of this node, including padding
    pub fn size(&self) -> usize {
        match self {
            SpaceTree::Leaf { size, .. } => *size,
            SpaceTree::Tuple { size, .. } => *size,
            SpaceTree::Dict { size, .. } => *size,
        }
    }

    /// Byte offset of this node in the packed buffer
    pub fn offset(&self) -> usize {
        match self {
            SpaceTree::Leaf { offset, .. } => *offset,
            SpaceTree::Tuple { offset, .. } => *offset,
            SpaceTree::Dict { offset, .. } => *offset,
        }
    }

    pub fn align(&self) -> usize {
        match self {
            SpaceTree::Leaf { dtype, .. } => dtype.size(),
            SpaceTree::Tuple { align, .. } => *align,
            SpaceTree::Dict { align, .. } => *align,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            SpaceTree::Leaf { .. } => "array",
            SpaceTree::Tuple { .. } => "tuple",
            SpaceTree::Dict { .. } => "dict",
        }
    }

    /// Write a nested sample into its byte ranges of `buf`.
    ///
    /// `path` tracks the current field for error messages.
    pub(crate) fn pack_into(
        &self,
        sample: &Sample,
        buf: &mut [u8],
        path: &mut Vec<PathSegment>,
    ) -> Result<()> {
        match (self, sample) {
            (
                SpaceTree::Leaf {
                    dtype,
                    shape,
                    offset,
                    size,
                },
                Sample::Array(arr),
            ) => {
                if arr.dtype() != *dtype {
                    return Err(mismatch(path, dtype.name(), arr.dtype().name()));
                }
                if arr.shape() != shape.as_slice() {
                    return Err(mismatch(
                        path,
                        format!("shape {:?}", shape),
                        format!("shape {:?}", arr.shape()),
                    ));
                }
                arr.write_le_bytes(&mut buf[*offset..*offset + *size]);
                Ok(())
            }
            (SpaceTree::Tuple { children, .. }, Sample::Tuple(items)) => {
                if items.len() != children.len() {
                    return Err(mismatch(
                        path,
                        format!("tuple of {}", children.len()),
                        format!("tuple of {}", items.len()),
                    ));
                }
                for (i, (child, item)) in children.iter().zip(items).enumerate() {
                    path.push(PathSegment::Index(i));
                    child.pack_into(item, buf, path)?;
                    path.pop();
                }
                Ok(())
            }
            (SpaceTree::Dict { children, .. }, Sample::Dict(map)) => {
                for (name, child) in children {
                    path.push(PathSegment::Key(name.clone()));
                    let item = map
                        .get(name)
                        .ok_or_else(|| mismatch(path, "a value", "missing key"))?;
                    child.pack_into(item, buf, path)?;
                    path.pop();
                }
                if let Some(extra) = map
                    .keys()
                    .find(|k| !children.iter().any(|(name, _)| name == *k))
                {
                    return Err(mismatch(
                        path,
                        format!("{} keys", children.len()),
                        format!("unexpected key {:?}", extra),
                    ));
                }
                Ok(())
            }
            (tree, other) => Err(mismatch(path, tree.kind(), other.kind())),
        }
    }

    /// Rebuild a nested sample from the byte ranges of `buf`.
    pub(crate) fn unpack_from(&self, buf: &[u8]) -> Result<Sample> {
        match self {
            SpaceTree::Leaf {
                dtype,
                shape,
                offset,
                size,
            } => TypedArray::from_le_bytes(*dtype, shape, &buf[*offset..*offset + *size])
                .map(Sample::Array),
            SpaceTree::Tuple { children, .. } => children
                .iter()
                .map(|child| child.unpack_from(buf))
                .collect::<Result<Vec<_>>>()
                .map(Sample::Tuple),
            SpaceTree::Dict { children, .. } => children
                .iter()
                .map(|(name, child)| Ok((name.clone(), child.unpack_from(buf)?)))
                .collect::<Result<IndexMap<_, _>>>()
                .map(Sample::Dict),
        }
    }
}
