//! Multi-dimensional shapes and row-major index arithmetic.
//!
//! Dimensions are listed slowest-varying first, so the last dimension is
//! the one that changes between consecutive flattened indices.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Per-dimension index or extent list.
pub type DimVec = SmallVec<[usize; 4]>;

/// Shape of a multi-dimensional array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions {
    /// Size of each dimension. Empty means scalar (rank 0).
    dims: DimVec,
}

impl Dimensions {
    /// Create scalar dimensions (rank 0).
    pub fn scalar() -> Self {
        Self { dims: SmallVec::new() }
    }

    /// Create 1D dimensions.
    pub fn d1(size: usize) -> Self {
        Self { dims: smallvec::smallvec![size] }
    }

    /// Create 2D dimensions.
    pub fn d2(slow: usize, fast: usize) -> Self {
        Self { dims: smallvec::smallvec![slow, fast] }
    }

    /// Create from a slice of sizes.
    pub fn from_slice(sizes: &[usize]) -> Self {
        Self { dims: SmallVec::from_slice(sizes) }
    }

    /// Get the rank (number of dimensions).
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Get the size of a specific dimension.
    pub fn size(&self, dim: usize) -> Option<usize> {
        self.dims.get(dim).copied()
    }

    /// Get all dimension sizes as a slice.
    pub fn sizes(&self) -> &[usize] {
        &self.dims
    }

    /// Total number of elements, or None on overflow.
    pub fn num_points(&self) -> Option<usize> {
        self.dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }

    /// Mixed-radix decomposition of a flattened index into per-dimension
    /// indices. Returns None if `flat` is outside the shape.
    pub fn unravel(&self, flat: usize) -> Option<DimVec> {
        if flat >= self.num_points()? {
            return None;
        }
        let mut rest = flat;
        let mut idx: DimVec = smallvec::smallvec![0; self.dims.len()];
        for (slot, &d) in idx.iter_mut().zip(self.dims.iter()).rev() {
            *slot = rest % d;
            rest /= d;
        }
        Some(idx)
    }

    /// Row-major strides, in elements.
    pub fn strides(&self) -> DimVec {
        let mut strides: DimVec = smallvec::smallvec![1; self.dims.len()];
        for i in (0..self.dims.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }
}

impl From<usize> for Dimensions {
    fn from(size: usize) -> Self {
        Self::d1(size)
    }
}

impl From<(usize, usize)> for Dimensions {
    fn from((slow, fast): (usize, usize)) -> Self {
        Self::d2(slow, fast)
    }
}

impl From<Vec<usize>> for Dimensions {
    fn from(v: Vec<usize>) -> Self {
        Self { dims: SmallVec::from_vec(v) }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, s) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", s)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let d = Dimensions::scalar();
        assert_eq!(d.rank(), 0);
        assert_eq!(d.num_points(), Some(1));
        assert_eq!(format!("{}", d), "[]");
    }

    #[test]
    fn test_2d() {
        let d = Dimensions::d2(640, 480);
        assert_eq!(d.rank(), 2);
        assert_eq!(d.size(1), Some(480));
        assert_eq!(d.num_points(), Some(640 * 480));
        assert_eq!(format!("{}", d), "[640 x 480]");
    }

    #[test]
    fn test_overflow() {
        let d = Dimensions::from_slice(&[usize::MAX, 2]);
        assert_eq!(d.num_points(), None);
    }

    #[test]
    fn test_unravel_last_is_fastest() {
        let d = Dimensions::d2(2, 3);
        assert_eq!(d.unravel(0).unwrap().as_slice(), &[0, 0]);
        assert_eq!(d.unravel(2).unwrap().as_slice(), &[0, 2]);
        assert_eq!(d.unravel(3).unwrap().as_slice(), &[1, 0]);
        assert_eq!(d.unravel(5).unwrap().as_slice(), &[1, 2]);
        assert!(d.unravel(6).is_none());

        let d = Dimensions::from_slice(&[3, 4, 5]);
        assert_eq!(d.unravel(59).unwrap().as_slice(), &[2, 3, 4]);
        assert_eq!(d.unravel(27).unwrap().as_slice(), &[1, 1, 2]);
    }

    #[test]
    fn test_strides() {
        let d = Dimensions::from_slice(&[3, 4, 5]);
        assert_eq!(d.strides().as_slice(), &[20, 5, 1]);
    }
}
