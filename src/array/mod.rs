//! Value arrays - one abstract array contract over several encodings.
//!
//! A [`ValueArray`] pairs a closed [`Encoding`] (constant fill, lattice,
//! external pointer, index- or mask-derived, inline tokens, jagged) with
//! the number of values stored per logical position. Any array can be
//! turned into a [`DenseArray`] through a [`Resolver`].
//!
//! ## Example
//!
//! ```ignore
//! use emlarray::array::{ConstantArray, LatticeArray, Resolver, ValueArray};
//!
//! let depths = ValueArray::lattice(LatticeArray::new(
//!     0i64,
//!     vec![ConstantArray::new(10i64, 2), ConstantArray::new(1i64, 3)],
//! ));
//! let dense = Resolver::new().resolve(&depths)?;
//! assert_eq!(dense.len(), 6);
//! ```

mod constant;
mod dense;
mod external;
mod inline;
mod jagged;
mod lattice;
mod mask;
mod resolve;

pub use constant::ConstantArray;
pub use dense::{DenseArray, JaggedValues, Values};
pub use external::{ExternalArray, ExternalDataArrayPart, NullValue};
pub use inline::InlineArray;
pub use jagged::JaggedArray;
pub use lattice::{LatticeArray, LatticeIter};
pub use mask::{
    expand_indices, true_positions, BooleanArrayFromIndexArray, IntegerArrayFromBooleanMaskArray,
};
pub use resolve::Resolver;

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::core::{ArrayStatistics, ReadRequest, ResolveConfig};
use crate::util::{ElementKind, Error, Result, ResultExt, Scalar};

/// The closed set of array encodings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Encoding {
    Constant(ConstantArray),
    Lattice(LatticeArray),
    External(ExternalArray),
    BooleanFromIndex(BooleanArrayFromIndexArray),
    IntegerFromMask(IntegerArrayFromBooleanMaskArray),
    Inline(InlineArray),
    Jagged(JaggedArray),
}

fn one() -> usize {
    1
}

fn is_one(n: &usize) -> bool {
    *n == 1
}

/// An array of boolean, integer, float or string values in any encoding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueArray {
    /// Values per logical position; physical length = length * count_per_value.
    #[serde(default = "one", skip_serializing_if = "is_one")]
    pub count_per_value: usize,
    #[serde(flatten)]
    pub encoding: Encoding,
    /// Statistics supplied by the producer. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_statistics: Option<ArrayStatistics>,
    #[serde(skip)]
    statistics: OnceLock<ArrayStatistics>,
}

impl ValueArray {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            count_per_value: 1,
            encoding,
            declared_statistics: None,
            statistics: OnceLock::new(),
        }
    }

    /// `value` repeated `count` times.
    pub fn constant(value: impl Into<Scalar>, count: usize) -> Self {
        Self::new(Encoding::Constant(ConstantArray::new(value, count)))
    }

    pub fn lattice(lattice: LatticeArray) -> Self {
        Self::new(Encoding::Lattice(lattice))
    }

    pub fn external(external: ExternalArray) -> Self {
        Self::new(Encoding::External(external))
    }

    /// Boolean array of `count` positions; `indices` hold `index_is_true`.
    pub fn boolean_from_indices(count: usize, indices: ValueArray, index_is_true: bool) -> Self {
        Self::new(Encoding::BooleanFromIndex(BooleanArrayFromIndexArray::new(
            count,
            indices,
            index_is_true,
        )))
    }

    /// Integer array of the positions where `mask` is true.
    pub fn integer_from_mask(mask: ValueArray) -> Self {
        Self::new(Encoding::IntegerFromMask(IntegerArrayFromBooleanMaskArray::new(mask)))
    }

    pub fn inline(inline: InlineArray) -> Self {
        Self::new(Encoding::Inline(inline))
    }

    /// Inline array holding `values`.
    pub fn from_values(values: Values) -> Self {
        Self::inline(InlineArray::new(values))
    }

    /// Inline array parsed from whitespace-separated tokens.
    pub fn parse_inline(kind: ElementKind, text: &str) -> Result<Self> {
        InlineArray::parse(kind, text).map(Self::inline)
    }

    pub fn jagged(jagged: JaggedArray) -> Self {
        Self::new(Encoding::Jagged(jagged))
    }

    pub fn with_count_per_value(mut self, count_per_value: usize) -> Self {
        self.count_per_value = count_per_value;
        self
    }

    pub fn with_declared_statistics(mut self, statistics: ArrayStatistics) -> Self {
        self.declared_statistics = Some(statistics);
        self
    }

    /// Element kind, fixed at construction.
    pub fn element_kind(&self) -> ElementKind {
        match &self.encoding {
            Encoding::Constant(c) => c.value.kind(),
            Encoding::Lattice(l) => l.kind(),
            Encoding::External(e) => e.kind,
            Encoding::BooleanFromIndex(_) => ElementKind::Boolean,
            Encoding::IntegerFromMask(_) => ElementKind::Integer,
            Encoding::Inline(i) => i.values.kind(),
            Encoding::Jagged(j) => j.elements.element_kind(),
        }
    }

    /// Encoding name, for diagnostics.
    pub fn variant_name(&self) -> &'static str {
        match &self.encoding {
            Encoding::Constant(_) => "ConstantArray",
            Encoding::Lattice(_) => "LatticeArray",
            Encoding::External(_) => "ExternalArray",
            Encoding::BooleanFromIndex(_) => "BooleanArrayFromIndexArray",
            Encoding::IntegerFromMask(_) => "IntegerArrayFromBooleanMaskArray",
            Encoding::Inline(_) => "InlineArray",
            Encoding::Jagged(_) => "JaggedArray",
        }
    }

    /// Null representation of this array's values.
    pub fn null_value(&self) -> NullValue {
        match &self.encoding {
            Encoding::External(e) => e.null_value,
            Encoding::Jagged(j) => j.elements.null_value(),
            _ if self.element_kind() == ElementKind::Float => NullValue::NaN,
            _ => NullValue::None,
        }
    }

    /// Number of stored values, when known without reading content.
    /// Declared index counts of mask-derived arrays are taken as given.
    pub fn physical_len(&self) -> Option<usize> {
        self.physical_len_with(true)
    }

    fn physical_len_with(&self, trust_declared: bool) -> Option<usize> {
        match &self.encoding {
            Encoding::Constant(c) => Some(c.count),
            Encoding::Lattice(l) => Some(l.count),
            Encoding::External(e) => Some(e.len()),
            Encoding::BooleanFromIndex(b) => Some(b.count),
            Encoding::IntegerFromMask(m) => m.total_index_count.filter(|_| trust_declared),
            Encoding::Inline(i) => Some(i.values.len()),
            Encoding::Jagged(j) => j.cumulative_length.physical_len_with(trust_declared),
        }
    }

    /// Logical length, when known without reading content.
    ///
    /// For jagged arrays this is the number of sub-arrays.
    pub fn static_len(&self) -> Option<usize> {
        self.physical_len().map(|n| n / self.count_per_value.max(1))
    }

    /// Logical length known without reading content under `config`.
    /// When declared counts are verified, a declared index count is not
    /// a length: the mask has to be read to confirm it.
    pub fn static_len_with(&self, config: &ResolveConfig) -> Option<usize> {
        self.physical_len_with(!config.verify_declared_counts)
            .map(|n| n / self.count_per_value.max(1))
    }

    /// Run every check that does not need the array content.
    pub fn validate(&self) -> Result<()> {
        self.validate_with(&ResolveConfig::default())
    }

    /// Run every content-free check under `config`.
    pub fn validate_with(&self, config: &ResolveConfig) -> Result<()> {
        if self.count_per_value == 0 {
            return Err(Error::malformed("count_per_value must be at least 1"));
        }
        match &self.encoding {
            Encoding::Constant(c) => c.validate()?,
            Encoding::Lattice(l) => l.validate()?,
            Encoding::External(e) => e.validate(config.allow_overlapping_parts)?,
            Encoding::BooleanFromIndex(b) => {
                b.validate()?;
                b.indices.validate_with(config).in_array("indices")?;
            }
            Encoding::IntegerFromMask(m) => {
                m.validate()?;
                m.mask.validate_with(config).in_array("mask")?;
            }
            Encoding::Inline(_) => {}
            Encoding::Jagged(j) => {
                if self.count_per_value != 1 {
                    return Err(Error::malformed(
                        "jagged arrays take count_per_value from their elements",
                    ));
                }
                j.validate()?;
                j.elements.validate_with(config).in_array("elements")?;
                j.cumulative_length
                    .validate_with(config)
                    .in_array("cumulative_length")?;
                return Ok(());
            }
        }
        match self.physical_len() {
            Some(n) if n % self.count_per_value != 0 => Err(Error::malformed(format!(
                "{} values do not divide into tuples of {}",
                n, self.count_per_value
            ))),
            _ => Ok(()),
        }
    }

    /// Every external window a resolution of this array would read.
    pub fn external_requests(&self) -> Vec<ReadRequest<'_>> {
        match &self.encoding {
            Encoding::External(e) => e.requests(),
            Encoding::BooleanFromIndex(b) => b.indices.external_requests(),
            Encoding::IntegerFromMask(m) => m.mask.external_requests(),
            Encoding::Jagged(j) => {
                let mut reqs = j.elements.external_requests();
                reqs.extend(j.cumulative_length.external_requests());
                reqs
            }
            Encoding::Constant(_) | Encoding::Lattice(_) | Encoding::Inline(_) => Vec::new(),
        }
    }

    pub(crate) fn statistics_cell(&self) -> &OnceLock<ArrayStatistics> {
        &self.statistics
    }
}

impl From<Values> for ValueArray {
    fn from(values: Values) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_kinds() {
        assert_eq!(ValueArray::constant(1i64, 3).element_kind(), ElementKind::Integer);
        let idx = ValueArray::from_values(Values::Integer(vec![1]));
        assert_eq!(
            ValueArray::boolean_from_indices(4, idx, true).element_kind(),
            ElementKind::Boolean
        );
        let mask = ValueArray::from_values(Values::Boolean(vec![true]));
        assert_eq!(ValueArray::integer_from_mask(mask).element_kind(), ElementKind::Integer);
    }

    #[test]
    fn test_static_len_with_tuples() {
        let a = ValueArray::constant(0.0, 12).with_count_per_value(3);
        assert_eq!(a.static_len(), Some(4));
        a.validate().unwrap();

        let bad = ValueArray::constant(0.0, 10).with_count_per_value(3);
        assert!(matches!(bad.validate(), Err(Error::MalformedArray(_))));

        let zero = ValueArray::constant(0.0, 3).with_count_per_value(0);
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_nested_validation_names_role() {
        let indices = ValueArray::from_values(Values::Float(vec![1.0]));
        let a = ValueArray::boolean_from_indices(3, indices, true);
        let err = a.validate().unwrap_err();
        assert!(err.to_string().contains("indices"));
        assert!(matches!(err.root(), Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_external_requests_nested() {
        let elements = ValueArray::external(ExternalArray::float(vec![
            ExternalDataArrayPart::range("f", "/values", 0, 8),
        ]));
        let cumulative = ValueArray::external(ExternalArray::integer(
            vec![ExternalDataArrayPart::range("f", "/offsets", 0, 3)],
            -1,
        ));
        let j = ValueArray::jagged(JaggedArray::new(elements, cumulative));
        let reqs = j.external_requests();
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[1].path.to_string(), "/offsets");
        assert_eq!(j.static_len(), Some(3));
        assert_eq!(j.null_value(), NullValue::NaN);
    }

    #[test]
    fn test_descriptor_json() {
        let json = r#"{
            "type": "Lattice",
            "start_value": 0,
            "offsets": [{"value": 10, "count": 2}, {"value": 1, "count": 3}],
            "count": 6
        }"#;
        let a: ValueArray = serde_json::from_str(json).unwrap();
        assert_eq!(a.variant_name(), "LatticeArray");
        assert_eq!(a.count_per_value, 1);
        assert_eq!(a.static_len(), Some(6));

        let back = serde_json::to_string(&a).unwrap();
        assert!(back.contains(r#""type":"Lattice""#));
        assert!(!back.contains("count_per_value"));
    }
}
