//! Resolved (materialized) array content.

use serde::{Deserialize, Serialize};

use super::{InlineArray, JaggedArray, ValueArray};
use crate::util::{ElementKind, Error, Result, Scalar};

/// A flat, typed sequence of element values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum Values {
    Boolean(Vec<bool>),
    Integer(Vec<i64>),
    Float(Vec<f64>),
    String(Vec<String>),
}

impl Values {
    /// Empty sequence of the given kind.
    pub fn empty(kind: ElementKind) -> Self {
        Self::with_capacity(kind, 0)
    }

    /// Empty sequence with room for `cap` values.
    pub fn with_capacity(kind: ElementKind, cap: usize) -> Self {
        match kind {
            ElementKind::Boolean => Self::Boolean(Vec::with_capacity(cap)),
            ElementKind::Integer => Self::Integer(Vec::with_capacity(cap)),
            ElementKind::Float => Self::Float(Vec::with_capacity(cap)),
            ElementKind::String => Self::String(Vec::with_capacity(cap)),
        }
    }

    /// `value` repeated `count` times.
    pub fn repeat(value: &Scalar, count: usize) -> Self {
        match value {
            Scalar::Boolean(v) => Self::Boolean(vec![*v; count]),
            Scalar::Integer(v) => Self::Integer(vec![*v; count]),
            Scalar::Float(v) => Self::Float(vec![*v; count]),
            Scalar::String(v) => Self::String(vec![v.clone(); count]),
        }
    }

    /// Element kind of this sequence.
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Boolean(_) => ElementKind::Boolean,
            Self::Integer(_) => ElementKind::Integer,
            Self::Float(_) => ElementKind::Float,
            Self::String(_) => ElementKind::String,
        }
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            Self::Boolean(v) => v.len(),
            Self::Integer(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Scalar> {
        match self {
            Self::Boolean(v) => v.get(index).map(|&x| Scalar::Boolean(x)),
            Self::Integer(v) => v.get(index).map(|&x| Scalar::Integer(x)),
            Self::Float(v) => v.get(index).map(|&x| Scalar::Float(x)),
            Self::String(v) => v.get(index).map(|x| Scalar::String(x.clone())),
        }
    }

    /// Copy of the values in `[lo, hi)`.
    pub fn slice(&self, lo: usize, hi: usize) -> Result<Self> {
        if lo > hi || hi > self.len() {
            return Err(Error::out_of_bounds(hi, self.len()));
        }
        Ok(match self {
            Self::Boolean(v) => Self::Boolean(v[lo..hi].to_vec()),
            Self::Integer(v) => Self::Integer(v[lo..hi].to_vec()),
            Self::Float(v) => Self::Float(v[lo..hi].to_vec()),
            Self::String(v) => Self::String(v[lo..hi].to_vec()),
        })
    }

    /// Append `other`, which must have the same kind.
    pub fn append(&mut self, other: Values) -> Result<()> {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a.extend(b),
            (Self::Integer(a), Self::Integer(b)) => a.extend(b),
            (Self::Float(a), Self::Float(b)) => a.extend(b),
            (Self::String(a), Self::String(b)) => a.extend(b),
            (a, b) => return Err(Error::type_mismatch(a.kind(), b.kind())),
        }
        Ok(())
    }

    /// Borrow as integers, or fail with a type mismatch.
    pub fn as_integers(&self) -> Result<&[i64]> {
        match self {
            Self::Integer(v) => Ok(v),
            other => Err(Error::type_mismatch(ElementKind::Integer, other.kind())),
        }
    }

    /// Borrow as booleans, or fail with a type mismatch.
    pub fn as_booleans(&self) -> Result<&[bool]> {
        match self {
            Self::Boolean(v) => Ok(v),
            other => Err(Error::type_mismatch(ElementKind::Boolean, other.kind())),
        }
    }
}

/// Fully resolved array: flat values, or sub-arrays of a jagged array.
#[derive(Clone, Debug, PartialEq)]
pub enum DenseArray {
    Flat {
        values: Values,
        count_per_value: usize,
    },
    Jagged(JaggedValues),
}

impl DenseArray {
    /// Flat array with one value per position.
    pub fn flat(values: Values) -> Self {
        Self::Flat { values, count_per_value: 1 }
    }

    /// Flat array holding `count_per_value`-tuples.
    pub fn tuples(values: Values, count_per_value: usize) -> Result<Self> {
        if count_per_value == 0 || values.len() % count_per_value != 0 {
            return Err(Error::malformed(format!(
                "{} values do not divide into tuples of {}",
                values.len(),
                count_per_value
            )));
        }
        Ok(Self::Flat { values, count_per_value })
    }

    /// Logical length: positions for flat arrays, sub-arrays for jagged ones.
    pub fn len(&self) -> usize {
        match self {
            Self::Flat { values, count_per_value } => values.len() / count_per_value,
            Self::Jagged(j) => j.num_sub_arrays(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element kind of the innermost values.
    pub fn kind(&self) -> ElementKind {
        self.leaf_values().kind()
    }

    /// Flat values, if this is not a jagged array.
    pub fn values(&self) -> Option<&Values> {
        match self {
            Self::Flat { values, .. } => Some(values),
            Self::Jagged(_) => None,
        }
    }

    /// The innermost flat values, descending through jagged nesting.
    pub fn leaf_values(&self) -> &Values {
        match self {
            Self::Flat { values, .. } => values,
            Self::Jagged(j) => j.elements.leaf_values(),
        }
    }

    /// Copy of logical positions `[lo, hi)`.
    pub fn slice(&self, lo: usize, hi: usize) -> Result<Self> {
        match self {
            Self::Flat { values, count_per_value } => Ok(Self::Flat {
                values: values.slice(lo * count_per_value, hi * count_per_value)?,
                count_per_value: *count_per_value,
            }),
            Self::Jagged(j) => j.slice(lo, hi).map(Self::Jagged),
        }
    }

    /// Materialize as an inline array holding the same logical content.
    pub fn to_inline(&self) -> ValueArray {
        match self {
            Self::Flat { values, count_per_value } => {
                ValueArray::inline(InlineArray::new(values.clone()))
                    .with_count_per_value(*count_per_value)
            }
            Self::Jagged(j) => {
                let cumulative = j.cumulative_length.iter().map(|&c| c as i64).collect();
                ValueArray::jagged(JaggedArray::new(
                    j.elements.to_inline(),
                    ValueArray::inline(InlineArray::new(Values::Integer(cumulative))),
                ))
            }
        }
    }
}

/// Resolved jagged array: flat elements partitioned by cumulative lengths.
#[derive(Clone, Debug, PartialEq)]
pub struct JaggedValues {
    elements: Box<DenseArray>,
    cumulative_length: Vec<usize>,
}

impl JaggedValues {
    /// Partition `elements` by `cumulative_length`.
    ///
    /// The cumulative lengths must be non-negative, non-decreasing, and end
    /// at the logical length of `elements`.
    pub fn new(elements: DenseArray, cumulative_length: &[i64]) -> Result<Self> {
        let total = elements.len();
        let mut cumulative = Vec::with_capacity(cumulative_length.len());
        let mut prev = 0usize;
        for (i, &c) in cumulative_length.iter().enumerate() {
            let c = usize::try_from(c).map_err(|_| {
                Error::malformed(format!("cumulative_length[{}] = {} is negative", i, c))
            })?;
            if c < prev {
                return Err(Error::malformed(format!(
                    "cumulative_length[{}] = {} is less than previous value {}",
                    i, c, prev
                )));
            }
            cumulative.push(c);
            prev = c;
        }
        if prev != total {
            return Err(Error::malformed(format!(
                "final cumulative length {} does not match element count {}",
                prev, total
            )));
        }
        Ok(Self {
            elements: Box::new(elements),
            cumulative_length: cumulative,
        })
    }

    /// Number of sub-arrays.
    #[inline]
    pub fn num_sub_arrays(&self) -> usize {
        self.cumulative_length.len()
    }

    /// The flat elements.
    pub fn elements(&self) -> &DenseArray {
        &self.elements
    }

    /// Cumulative end offsets, one per sub-array.
    pub fn cumulative_length(&self) -> &[usize] {
        &self.cumulative_length
    }

    /// Element range `[lo, hi)` of sub-array `index`.
    pub fn bounds(&self, index: usize) -> Result<(usize, usize)> {
        let hi = *self
            .cumulative_length
            .get(index)
            .ok_or_else(|| Error::out_of_bounds(index, self.cumulative_length.len()))?;
        let lo = if index == 0 { 0 } else { self.cumulative_length[index - 1] };
        Ok((lo, hi))
    }

    /// Sub-array `index`.
    pub fn sub_array(&self, index: usize) -> Result<DenseArray> {
        let (lo, hi) = self.bounds(index)?;
        self.elements.slice(lo, hi).map_err(|e| e.in_sub_array(index))
    }

    /// Iterate over all sub-arrays in order.
    pub fn iter(&self) -> impl Iterator<Item = Result<DenseArray>> + '_ {
        (0..self.num_sub_arrays()).map(move |i| self.sub_array(i))
    }

    fn slice(&self, lo: usize, hi: usize) -> Result<Self> {
        if lo > hi || hi > self.num_sub_arrays() {
            return Err(Error::out_of_bounds(hi, self.num_sub_arrays()));
        }
        let base = if lo == 0 { 0 } else { self.cumulative_length[lo - 1] };
        let end = if hi == 0 { 0 } else { self.cumulative_length[hi - 1] };
        Ok(Self {
            elements: Box::new(self.elements.slice(base, end)?),
            cumulative_length: self.cumulative_length[lo..hi].iter().map(|c| c - base).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> DenseArray {
        DenseArray::flat(Values::String(
            "abcdefgh".chars().map(|c| c.to_string()).collect(),
        ))
    }

    #[test]
    fn test_values_append_kind_mismatch() {
        let mut a = Values::Integer(vec![1, 2]);
        a.append(Values::Integer(vec![3])).unwrap();
        assert_eq!(a, Values::Integer(vec![1, 2, 3]));
        let err = a.append(Values::Float(vec![1.0])).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_tuples_length() {
        let d = DenseArray::tuples(Values::Float(vec![0.0; 6]), 3).unwrap();
        assert_eq!(d.len(), 2);
        assert!(DenseArray::tuples(Values::Float(vec![0.0; 5]), 3).is_err());
    }

    #[test]
    fn test_jagged_sub_arrays() {
        let j = JaggedValues::new(letters(), &[3, 7, 8]).unwrap();
        assert_eq!(j.num_sub_arrays(), 3);
        let s1 = j.sub_array(1).unwrap();
        assert_eq!(
            s1.values(),
            Some(&Values::String(vec!["d".into(), "e".into(), "f".into(), "g".into()]))
        );
        assert!(matches!(
            j.sub_array(3),
            Err(Error::IndexOutOfBounds { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_jagged_rejects_bad_cumulative() {
        assert!(JaggedValues::new(letters(), &[3, 2, 8]).is_err());
        assert!(JaggedValues::new(letters(), &[3, 7]).is_err());
        assert!(JaggedValues::new(letters(), &[-1, 8]).is_err());
    }

    #[test]
    fn test_jagged_empty_sub_array() {
        let j = JaggedValues::new(letters(), &[0, 8, 8]).unwrap();
        assert!(j.sub_array(0).unwrap().is_empty());
        assert_eq!(j.sub_array(1).unwrap().len(), 8);
        assert!(j.sub_array(2).unwrap().is_empty());
    }

    #[test]
    fn test_nested_jagged_slice() {
        let inner = JaggedValues::new(letters(), &[2, 3, 5, 8]).unwrap();
        let outer = JaggedValues::new(DenseArray::Jagged(inner), &[1, 4]).unwrap();
        let second = outer.sub_array(1).unwrap();
        let DenseArray::Jagged(second) = second else {
            panic!("expected jagged sub-array");
        };
        assert_eq!(second.cumulative_length(), &[1, 3, 6]);
        assert_eq!(
            second.sub_array(2).unwrap().values(),
            Some(&Values::String(vec!["f".into(), "g".into(), "h".into()]))
        );
    }
}
