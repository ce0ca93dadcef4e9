//! Space contract checks.

use crate::spaces::{DynSpace, Sample, TypedArray};
use crate::{PufferError, Result};

/// Verify that `sample` is structurally compatible with `space` and
/// contained in it.
pub fn check_space(sample: &Sample, space: &DynSpace) -> Result<()> {
    if !space.matches_structure(sample) {
        return Err(PufferError::ContractViolation(format!(
            "cannot check {} sample against {} space {:?}",
            sample.kind(),
            space.kind(),
            space
        )));
    }
    if !space.contains(sample) {
        return Err(PufferError::ContractViolation(format!(
            "data {:?} not in space {:?}",
            sample, space
        )));
    }
    Ok(())
}

/// Verify that a flat array is contained in a primitive `space`.
pub fn check_array(value: &TypedArray, space: &DynSpace) -> Result<()> {
    if !space.is_leaf() {
        return Err(PufferError::ContractViolation(format!(
            "cannot check a flat {} array of shape {:?} against {} space",
            value.dtype(),
            value.shape(),
            space.kind()
        )));
    }
    if !space.contains_array(value) {
        return Err(PufferError::ContractViolation(format!(
            "data {:?} not in space {:?}",
            value, space
        )));
    }
    Ok(())
}

/// One-shot latch around a space check.
///
/// The check runs on every call until it first passes. After that it is
/// skipped for the lifetime of the latch.
#[derive(Clone, Debug, Default)]
pub struct SpaceCheck {
    checked: bool,
}

impl SpaceCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a check has already passed
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Run `check` unless a previous one passed. A failing check leaves the
    /// latch open.
    pub fn run<F>(&mut self, check: F) -> Result<()>
    where
        F: FnOnce() -> Result<()>,
    {
        if self.checked {
            return Ok(());
        }
        check()?;
        self.checked = true;
        tracing::debug!("space check passed; skipping further checks");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spaces::{Box, DType, Dict, Discrete};

    #[test]
    fn test_check_space() {
        let space: DynSpace = Dict::from_pairs(vec![
            ("a", Discrete::new(3).into()),
            ("b", Box::unit(&[2]).into()),
        ])
        .into();
        let good = Sample::dict([
            ("a", Sample::scalar(2i64)),
            ("b", Sample::array(&[2], vec![0.0f32, 1.0]).unwrap()),
        ]);
        assert!(check_space(&good, &space).is_ok());

        let out_of_range = Sample::dict([
            ("a", Sample::scalar(3i64)),
            ("b", Sample::array(&[2], vec![0.0f32, 1.0]).unwrap()),
        ]);
        assert!(matches!(
            check_space(&out_of_range, &space),
            Err(PufferError::ContractViolation(_))
        ));

        let wrong_shape = Sample::tuple(vec![Sample::scalar(0i64)]);
        let err = check_space(&wrong_shape, &space).unwrap_err();
        assert!(err.to_string().contains("cannot check"));
    }

    #[test]
    fn test_check_array() {
        let space: DynSpace = Box::full_range(&[4], DType::U8).into();
        assert!(check_array(&TypedArray::zeros(DType::U8, &[4]), &space).is_ok());
        assert!(check_array(&TypedArray::zeros(DType::U8, &[5]), &space).is_err());
        assert!(check_array(&TypedArray::zeros(DType::F32, &[4]), &space).is_err());

        let composite: DynSpace = Dict::from_pairs(vec![]).into();
        assert!(check_array(&TypedArray::zeros(DType::U8, &[0]), &composite).is_err());
    }

    #[test]
    fn test_latch_runs_until_first_pass() {
        let mut latch = SpaceCheck::new();
        let mut calls = 0;

        let result = latch.run(|| {
            calls += 1;
            Err(PufferError::ContractViolation("bad".into()))
        });
        assert!(result.is_err());
        assert!(!latch.is_checked());

        latch
            .run(|| {
                calls += 1;
                Ok(())
            })
            .unwrap();
        assert!(latch.is_checked());

        latch
            .run(|| {
                calls += 1;
                Err(PufferError::ContractViolation("never seen".into()))
            })
            .unwrap();
        assert_eq!(calls, 2);
    }
}
