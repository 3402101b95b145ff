//! Affine lattice arrays.
//!
//! Values are an affine function of the multi-dimensional index:
//! `start_value + sum(index_i * offset_i)`. Dimensions are listed
//! slowest-varying first, each given as a constant array whose value is
//! the offset and whose count is the dimension size.

use serde::{Deserialize, Serialize};

use super::{ConstantArray, Values};
use crate::util::{Dimensions, ElementKind, Error, Result, Scalar};

/// Lattice of integer or float values generated from a start value and
/// per-dimension offsets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatticeArray {
    pub start_value: Scalar,
    pub offsets: Vec<ConstantArray>,
    /// Declared total element count.
    pub count: usize,
}

impl LatticeArray {
    /// Lattice whose declared count is the product of the dimension sizes.
    pub fn new(start_value: impl Into<Scalar>, offsets: Vec<ConstantArray>) -> Self {
        let count = offsets.iter().map(|o| o.count).product();
        Self::with_count(start_value, offsets, count)
    }

    /// Lattice with an explicitly declared total count.
    pub fn with_count(
        start_value: impl Into<Scalar>,
        offsets: Vec<ConstantArray>,
        count: usize,
    ) -> Self {
        Self {
            start_value: start_value.into(),
            offsets,
            count,
        }
    }

    /// Element kind (integer or float).
    pub fn kind(&self) -> ElementKind {
        self.start_value.kind()
    }

    /// Shape formed by the offset counts.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from(self.offsets.iter().map(|o| o.count).collect::<Vec<_>>())
    }

    pub fn validate(&self) -> Result<()> {
        let kind = self.kind();
        if !kind.is_numeric() {
            return Err(Error::type_mismatch("integer or float", kind));
        }
        if self.offsets.is_empty() {
            return Err(Error::malformed("lattice array has no dimensions"));
        }
        for offset in &self.offsets {
            offset.validate()?;
            if offset.value.kind() != kind {
                return Err(Error::type_mismatch(kind, offset.value.kind()));
            }
        }
        let product = self
            .dimensions()
            .num_points()
            .ok_or_else(|| Error::malformed("lattice dimension product overflows"))?;
        if product != self.count {
            return Err(Error::malformed(format!(
                "lattice dimensions {} hold {} values but count is {}",
                self.dimensions(),
                product,
                self.count
            )));
        }
        if let Scalar::Integer(start) = self.start_value {
            self.check_integer_range(start)?;
        }
        Ok(())
    }

    /// Ensure every generated integer fits in i64.
    fn check_integer_range(&self, start: i64) -> Result<()> {
        let overflow = || Error::malformed("lattice values overflow 64-bit integers");
        let (mut lo, mut hi) = (start as i128, start as i128);
        for offset in &self.offsets {
            let Scalar::Integer(o) = offset.value else { continue };
            let reach = (offset.count as i128 - 1)
                .checked_mul(o as i128)
                .ok_or_else(overflow)?;
            if reach < 0 {
                lo = lo.checked_add(reach).ok_or_else(overflow)?;
            } else {
                hi = hi.checked_add(reach).ok_or_else(overflow)?;
            }
        }
        if lo < i64::MIN as i128 || hi > i64::MAX as i128 {
            return Err(overflow());
        }
        Ok(())
    }

    /// Value at flattened index `k`, without materializing the array.
    pub fn value_at(&self, k: usize) -> Result<Scalar> {
        self.validate()?;
        let index = self
            .dimensions()
            .unravel(k)
            .ok_or_else(|| Error::out_of_bounds(k, self.count))?;
        Ok(self.value_at_index(&index))
    }

    /// Value at a per-dimension index. Assumes a validated lattice and an
    /// index inside its dimensions.
    fn value_at_index(&self, index: &[usize]) -> Scalar {
        let steps = self.offsets.iter().zip(index).rev();
        match self.start_value {
            Scalar::Float(start) => {
                let acc: f64 = steps
                    .filter_map(|(o, &i)| o.value.as_f64().map(|step| i as f64 * step))
                    .sum();
                Scalar::Float(start + acc)
            }
            Scalar::Integer(start) => {
                let acc = steps.fold(start as i128, |acc, (o, &i)| match o.value {
                    Scalar::Integer(step) => acc + i as i128 * step as i128,
                    _ => acc,
                });
                Scalar::Integer(acc as i64)
            }
            ref other => other.clone(),
        }
    }

    /// Stream the values in row-major order.
    pub fn iter(&self) -> Result<LatticeIter<'_>> {
        self.validate()?;
        Ok(LatticeIter {
            lattice: self,
            dims: self.dimensions(),
            next: 0,
        })
    }

    /// Materialize every value.
    pub fn resolve(&self) -> Result<Values> {
        let mut out = Values::with_capacity(self.kind(), self.count);
        match &mut out {
            Values::Integer(v) => v.extend(self.iter()?.filter_map(|s| match s {
                Scalar::Integer(x) => Some(x),
                _ => None,
            })),
            Values::Float(v) => v.extend(self.iter()?.filter_map(|s| s.as_f64())),
            _ => return Err(Error::type_mismatch("integer or float", self.kind())),
        }
        Ok(out)
    }
}

/// Streaming iterator over lattice values.
pub struct LatticeIter<'a> {
    lattice: &'a LatticeArray,
    dims: Dimensions,
    next: usize,
}

impl Iterator for LatticeIter<'_> {
    type Item = Scalar;

    fn next(&mut self) -> Option<Scalar> {
        let index = self.dims.unravel(self.next)?;
        self.next += 1;
        Some(self.lattice.value_at_index(&index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.lattice.count.saturating_sub(self.next);
        (n, Some(n))
    }
}

impl ExactSizeIterator for LatticeIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_2x3() -> LatticeArray {
        LatticeArray::new(0i64, vec![ConstantArray::new(10i64, 2), ConstantArray::new(1i64, 3)])
    }

    #[test]
    fn test_row_major_values() {
        let l = grid_2x3();
        assert_eq!(l.resolve().unwrap(), Values::Integer(vec![0, 1, 2, 10, 11, 12]));
    }

    #[test]
    fn test_value_at_matches_resolve() {
        let l = LatticeArray::new(
            5i64,
            vec![
                ConstantArray::new(100i64, 3),
                ConstantArray::new(-7i64, 2),
                ConstantArray::new(1i64, 4),
            ],
        );
        let Values::Integer(all) = l.resolve().unwrap() else { panic!("integer lattice") };
        for (k, &v) in all.iter().enumerate() {
            assert_eq!(l.value_at(k).unwrap(), Scalar::Integer(v));
        }
        assert_eq!(l.value_at(23).unwrap(), Scalar::Integer(5 + 200 - 7 + 3));
        assert!(matches!(l.value_at(24), Err(Error::IndexOutOfBounds { .. })));
    }

    #[test]
    fn test_float_lattice() {
        let l = LatticeArray::new(1.5, vec![ConstantArray::new(0.5, 3)]);
        assert_eq!(l.resolve().unwrap(), Values::Float(vec![1.5, 2.0, 2.5]));
        assert_eq!(l.iter().unwrap().len(), 3);
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let l = LatticeArray::with_count(
            0i64,
            vec![ConstantArray::new(10i64, 2), ConstantArray::new(1i64, 3)],
            7,
        );
        assert!(matches!(l.validate(), Err(Error::MalformedArray(_))));
    }

    #[test]
    fn test_mixed_kinds_rejected() {
        let l = LatticeArray::new(0i64, vec![ConstantArray::new(0.5, 2)]);
        assert!(matches!(l.validate(), Err(Error::TypeMismatch { .. })));

        let s = LatticeArray::new("a", vec![ConstantArray::new("b", 2)]);
        assert!(matches!(s.validate(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn test_integer_overflow_rejected() {
        let l = LatticeArray::new(i64::MAX - 1, vec![ConstantArray::new(1i64, 3)]);
        assert!(matches!(l.validate(), Err(Error::MalformedArray(_))));
    }
}
