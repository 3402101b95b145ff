//! Sparse boolean encodings: booleans from an index list, and indices
//! from a boolean mask.

use serde::{Deserialize, Serialize};

use super::ValueArray;
use crate::util::{ElementKind, Error, Result};

/// Boolean array of length `count` where the listed positions hold
/// `index_is_true` and every other position holds its opposite.
///
/// Repeated indices are allowed and have no further effect.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BooleanArrayFromIndexArray {
    pub count: usize,
    pub indices: Box<ValueArray>,
    pub index_is_true: bool,
}

impl BooleanArrayFromIndexArray {
    pub fn new(count: usize, indices: ValueArray, index_is_true: bool) -> Self {
        Self {
            count,
            indices: Box::new(indices),
            index_is_true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let kind = self.indices.element_kind();
        if kind != ElementKind::Integer {
            return Err(Error::type_mismatch(ElementKind::Integer, kind).in_array("indices"));
        }
        if self.indices.count_per_value != 1 {
            return Err(Error::malformed("index array must hold one value per position")
                .in_array("indices"));
        }
        Ok(())
    }
}

/// Expand a sparse index list into a dense boolean vector.
pub fn expand_indices(count: usize, indices: &[i64], index_is_true: bool) -> Result<Vec<bool>> {
    let mut out = vec![!index_is_true; count];
    for &i in indices {
        let slot = usize::try_from(i)
            .ok()
            .and_then(|pos| out.get_mut(pos))
            .ok_or(Error::IndexOutOfBounds { index: i, count })?;
        *slot = index_is_true;
    }
    Ok(out)
}

/// Integer array of the ascending positions where a boolean mask is true.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IntegerArrayFromBooleanMaskArray {
    pub mask: Box<ValueArray>,
    /// Declared number of true positions, checked on resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_index_count: Option<usize>,
}

impl IntegerArrayFromBooleanMaskArray {
    pub fn new(mask: ValueArray) -> Self {
        Self {
            mask: Box::new(mask),
            total_index_count: None,
        }
    }

    pub fn with_total_index_count(mut self, count: usize) -> Self {
        self.total_index_count = Some(count);
        self
    }

    pub fn validate(&self) -> Result<()> {
        let kind = self.mask.element_kind();
        if kind != ElementKind::Boolean {
            return Err(Error::type_mismatch(ElementKind::Boolean, kind).in_array("mask"));
        }
        if self.mask.count_per_value != 1 {
            return Err(
                Error::malformed("mask array must hold one value per position").in_array("mask")
            );
        }
        Ok(())
    }
}

/// Positions of every `true` element, ascending.
pub fn true_positions(mask: &[bool]) -> Vec<i64> {
    mask.iter()
        .enumerate()
        .filter(|&(_, &b)| b)
        .map(|(i, _)| i as i64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand() {
        assert_eq!(
            expand_indices(5, &[1, 3], true).unwrap(),
            vec![false, true, false, true, false]
        );
        assert_eq!(
            expand_indices(4, &[0], false).unwrap(),
            vec![false, true, true, true]
        );
    }

    #[test]
    fn test_duplicates_idempotent() {
        assert_eq!(
            expand_indices(3, &[2, 2, 2], true).unwrap(),
            expand_indices(3, &[2], true).unwrap()
        );
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            expand_indices(3, &[3], true),
            Err(Error::IndexOutOfBounds { index: 3, count: 3 })
        ));
        assert!(matches!(
            expand_indices(3, &[-1], true),
            Err(Error::IndexOutOfBounds { index: -1, count: 3 })
        ));
        assert!(matches!(
            expand_indices(3, &[0, i64::MIN], false),
            Err(Error::IndexOutOfBounds { index: i64::MIN, count: 3 })
        ));
    }

    #[test]
    fn test_tupled_mask_rejected() {
        let mask = ValueArray::from_values(crate::array::Values::Boolean(vec![
            true, false, false, true,
        ]))
        .with_count_per_value(2);
        let err = IntegerArrayFromBooleanMaskArray::new(mask).validate().unwrap_err();
        assert!(err.to_string().contains("mask"));
        assert!(matches!(err.root(), Error::MalformedArray(_)));
    }

    #[test]
    fn test_positions_roundtrip() {
        let mask = expand_indices(5, &[1, 3], true).unwrap();
        assert_eq!(true_positions(&mask), vec![1, 3]);
        assert!(true_positions(&[false, false]).is_empty());
    }
}
