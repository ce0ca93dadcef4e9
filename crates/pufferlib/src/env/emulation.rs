//! Flat emulation of nested observation and action spaces.

use crate::spaces::{Box, DType, DynSpace, Layout, MultiDiscrete, Sample, TypedArray};
use crate::{PufferError, Result};

/// A native space together with its flat counterpart and the layout that
/// converts samples between them.
#[derive(Clone, Debug, PartialEq)]
pub struct EmulatedSpace {
    /// Space the environment speaks
    native: DynSpace,
    /// Space the learner sees
    flat: DynSpace,
    layout: Layout,
    flat_dtype: DType,
    /// Native space is already flat; samples pass through untouched
    identity: bool,
    /// Action leaves with mixed index types, carried as `i64` per element
    widened: bool,
}

impl EmulatedSpace {
    fn identity(native: &DynSpace, flat_dtype: DType) -> Self {
        Self {
            native: native.clone(),
            flat: native.clone(),
            layout: Layout::compile(native),
            flat_dtype,
            identity: true,
            widened: false,
        }
    }

    pub fn native_space(&self) -> &DynSpace {
        &self.native
    }

    pub fn flat_space(&self) -> &DynSpace {
        &self.flat
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Element type of flat samples
    pub fn flat_dtype(&self) -> DType {
        self.flat_dtype
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    /// Number of elements in one flat sample
    pub fn flat_len(&self) -> usize {
        self.flat.shape().map_or(0, |s| s.iter().product())
    }

    /// Convert a native sample to its flat representation.
    pub fn emulate(&self, sample: &Sample) -> Result<TypedArray> {
        if self.widened {
            return self.emulate_widened(sample);
        }
        if !self.identity {
            return self.layout.pack(sample, self.flat_dtype);
        }
        match sample {
            Sample::Array(array) => Ok(array.clone()),
            other => Err(PufferError::StructuralMismatch {
                path: "<root>".to_string(),
                expected: self.native.kind().to_string(),
                actual: other.kind().to_string(),
            }),
        }
    }

    /// Convert a flat sample back to the native structure.
    pub fn nativize(&self, flat: &TypedArray) -> Result<Sample> {
        if self.identity {
            return Ok(Sample::Array(flat.clone()));
        }
        if self.widened {
            return self.nativize_widened(flat);
        }
        self.layout.unpack(flat)
    }

    fn emulate_widened(&self, sample: &Sample) -> Result<TypedArray> {
        let bytes = self.layout.pack(sample, DType::U8)?.to_le_bytes();
        let mut values = Vec::with_capacity(self.flat_len());
        for field in self.layout.fields() {
            let leaf = TypedArray::from_le_bytes(
                field.dtype,
                &field.shape,
                &bytes[field.offset..field.offset + field.size()],
            )?;
            let wide = leaf.cast_integer(DType::I64)?;
            values.extend(wide.as_array::<i64>().into_iter().flatten().copied());
        }
        TypedArray::from_vec(&[values.len()], values)
    }

    fn nativize_widened(&self, flat: &TypedArray) -> Result<Sample> {
        let wide = flat.cast_integer(DType::I64)?;
        let values: Vec<i64> = wide
            .as_array::<i64>()
            .map(|a| a.iter().copied().collect())
            .unwrap_or_default();
        if values.len() != self.flat_len() {
            return Err(PufferError::StructuralMismatch {
                path: "<root>".to_string(),
                expected: format!("{} indices", self.flat_len()),
                actual: format!("{} indices", values.len()),
            });
        }

        let mut buf = vec![0u8; self.layout.size()];
        let mut rest = values.as_slice();
        for field in self.layout.fields() {
            let (head, tail) = rest.split_at(field.shape.iter().product());
            rest = tail;
            TypedArray::from_vec(&field.shape, head.to_vec())?
                .cast_integer(field.dtype)?
                .write_le_bytes(&mut buf[field.offset..field.offset + field.size()]);
        }
        self.layout
            .unpack(&TypedArray::from_le_bytes(DType::U8, &[buf.len()], &buf)?)
    }

    /// All-zero flat sample, used to pad absent agents
    pub fn zeros(&self) -> TypedArray {
        let shape = self.flat.shape().unwrap_or(&[]);
        TypedArray::zeros(self.flat_dtype, shape)
    }
}

/// Derive the flat observation space of `space`.
///
/// A bare `Box` passes through unchanged. Anything else becomes a 1-D box
/// over the common leaf element type, or over bytes when the leaves
/// disagree. The flat box spans the full range of its element type.
pub fn emulate_observation_space(space: &DynSpace) -> Result<EmulatedSpace> {
    if let DynSpace::Box(b) = space {
        return Ok(EmulatedSpace::identity(space, b.dtype()));
    }

    let layout = Layout::compile(space);
    let mut dtypes = layout.fields().iter().map(|f| f.dtype);
    let flat_dtype = match dtypes.next() {
        Some(first) if dtypes.all(|d| d == first) => first,
        _ => DType::U8,
    };
    let len = layout.num_elements(flat_dtype).ok_or_else(|| {
        PufferError::Config(format!(
            "observation layout of {} bytes does not divide into {} elements",
            layout.size(),
            flat_dtype
        ))
    })?;

    tracing::debug!(
        native = space.kind(),
        flat_dtype = %flat_dtype,
        len,
        fields = layout.fields().len(),
        "emulated observation space"
    );

    Ok(EmulatedSpace {
        native: space.clone(),
        flat: Box::full_range(&[len], flat_dtype).into(),
        layout,
        flat_dtype,
        identity: false,
        widened: false,
    })
}

/// Derive the flat action space of `space`.
///
/// A bare `Discrete` or `MultiDiscrete` passes through unchanged. Composites
/// become a `MultiDiscrete` of the leaf arities in traversal order. Every
/// leaf must be discrete. Leaves sharing one index type keep it; mixed
/// index types widen the flat space to `i64`.
pub fn emulate_action_space(space: &DynSpace) -> Result<EmulatedSpace> {
    match space {
        DynSpace::Discrete(d) => return Ok(EmulatedSpace::identity(space, d.dtype())),
        DynSpace::MultiDiscrete(md) => return Ok(EmulatedSpace::identity(space, md.dtype())),
        DynSpace::Box(_) => {
            return Err(PufferError::Config(
                "box action spaces cannot be emulated as discrete choices".to_string(),
            ))
        }
        DynSpace::Tuple(_) | DynSpace::Dict(_) => {}
    }

    let layout = Layout::compile(space);
    let leaves = crate::spaces::flatten_space(space);
    let mut nvec = Vec::new();
    let mut index_dtype = None;
    let mut mixed = false;
    for (leaf, field) in leaves.iter().zip(layout.fields()) {
        match leaf {
            DynSpace::Discrete(d) => nvec.push(d.n),
            DynSpace::MultiDiscrete(md) => nvec.extend(md.nvec.iter().copied()),
            _ => {
                return Err(PufferError::Config(format!(
                    "action leaf {} is a {} space; only discrete leaves can be emulated",
                    field.name(),
                    leaf.kind()
                )))
            }
        }
        match index_dtype {
            None => index_dtype = Some(field.dtype),
            Some(d) => mixed |= d != field.dtype,
        }
    }

    let index_dtype = index_dtype.ok_or_else(|| {
        PufferError::Config("action space has no leaves to emulate".to_string())
    })?;
    let flat_dtype = if mixed { DType::I64 } else { index_dtype };

    tracing::debug!(
        native = space.kind(),
        flat_dtype = %flat_dtype,
        arities = ?nvec,
        widened = mixed,
        "emulated action space"
    );

    Ok(EmulatedSpace {
        native: space.clone(),
        flat: MultiDiscrete::new(nvec).with_dtype(flat_dtype).into(),
        layout,
        flat_dtype,
        identity: false,
        widened: mixed,
    })
}
