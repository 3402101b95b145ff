//! Resolution dispatcher.
//!
//! Turns any [`ValueArray`] into a [`DenseArray`]. Every encoding except
//! external arrays resolves purely in memory; external parts are read
//! through the [`ExternalStore`] the resolver was built with.

use std::borrow::Cow;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use super::{
    expand_indices, true_positions, DenseArray, Encoding, ExternalArray, JaggedValues, ValueArray,
    Values,
};
use crate::core::{ArrayStatistics, ExternalStore, ReadRequest, ResolveConfig};
use crate::util::{Error, Result, ResultExt};

/// Resolves value arrays, delegating external reads to a store.
///
/// Holds no mutable state; one resolver can be shared across threads.
#[derive(Clone, Copy, Default)]
pub struct Resolver<'s> {
    store: Option<&'s dyn ExternalStore>,
    config: ResolveConfig,
}

impl<'s> Resolver<'s> {
    /// Resolver without a store. External arrays fail to resolve.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver reading external arrays from `store`.
    pub fn with_store(store: &'s dyn ExternalStore) -> Self {
        Self {
            store: Some(store),
            config: ResolveConfig::default(),
        }
    }

    pub fn config(mut self, config: ResolveConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolve_config(&self) -> &ResolveConfig {
        &self.config
    }

    /// Validate `array` and materialize its logical content.
    pub fn resolve(&self, array: &ValueArray) -> Result<DenseArray> {
        array.validate_with(&self.config)?;
        self.dispatch(array)
    }

    /// Resolve a non-jagged array to its flat values.
    pub fn resolve_values(&self, array: &ValueArray) -> Result<Values> {
        array.validate_with(&self.config)?;
        self.flat(array)
    }

    /// Logical length; reads content only when it is not known statically.
    pub fn len(&self, array: &ValueArray) -> Result<usize> {
        array.validate_with(&self.config)?;
        match array.static_len_with(&self.config) {
            Some(n) => Ok(n),
            None => self.dispatch(array).map(|d| d.len()),
        }
    }

    /// Sub-array `index` of a jagged array.
    pub fn sub_array(&self, array: &ValueArray, index: usize) -> Result<DenseArray> {
        match self.resolve(array)? {
            DenseArray::Jagged(j) => j.sub_array(index),
            DenseArray::Flat { .. } => Err(Error::type_mismatch("JaggedArray", array.variant_name())),
        }
    }

    /// Statistics recomputed from the array content.
    ///
    /// Arrays that resolve entirely in memory compute their statistics at
    /// most once per instance; concurrent callers get the same result.
    /// Arrays reading external windows are recomputed on every call, since
    /// their content depends on the store behind this resolver.
    pub fn statistics<'a>(&self, array: &'a ValueArray) -> Result<Cow<'a, ArrayStatistics>> {
        let in_memory = array.external_requests().is_empty();
        if in_memory {
            if let Some(stats) = array.statistics_cell().get() {
                return Ok(Cow::Borrowed(stats));
            }
        }
        let dense = self.resolve(array)?;
        let stats = ArrayStatistics::compute(dense.leaf_values(), &array.null_value());
        debug!(
            variant = array.variant_name(),
            valid = ?stats.valid_value_count,
            in_memory,
            "computed array statistics"
        );
        if in_memory {
            Ok(Cow::Borrowed(array.statistics_cell().get_or_init(|| stats)))
        } else {
            Ok(Cow::Owned(stats))
        }
    }

    /// Compare producer-declared statistics with a recomputation.
    /// Arrays without declared statistics trivially agree.
    pub fn check_declared_statistics(&self, array: &ValueArray) -> Result<bool> {
        let Some(declared) = &array.declared_statistics else {
            return Ok(true);
        };
        let computed = self.statistics(array)?;
        let agrees = declared.agrees_with(&computed);
        if !agrees {
            warn!(
                variant = array.variant_name(),
                ?declared,
                ?computed,
                "declared statistics disagree with array content"
            );
        }
        Ok(agrees)
    }

    fn dispatch(&self, array: &ValueArray) -> Result<DenseArray> {
        trace!(variant = array.variant_name(), kind = %array.element_kind(), "resolving");
        let values = match &array.encoding {
            Encoding::Constant(c) => c.resolve(),
            Encoding::Lattice(l) => l.resolve()?,
            Encoding::External(e) => self.read_external(e)?,
            Encoding::BooleanFromIndex(b) => {
                let indices = self.flat(&b.indices).in_array("indices")?;
                Values::Boolean(expand_indices(
                    b.count,
                    indices.as_integers()?,
                    b.index_is_true,
                )?)
            }
            Encoding::IntegerFromMask(m) => {
                let mask = self.flat(&m.mask).in_array("mask")?;
                let positions = true_positions(mask.as_booleans()?);
                if let Some(declared) = m.total_index_count {
                    if self.config.verify_declared_counts && declared != positions.len() {
                        return Err(Error::malformed(format!(
                            "mask has {} true positions but {} were declared",
                            positions.len(),
                            declared
                        )));
                    }
                }
                Values::Integer(positions)
            }
            Encoding::Inline(i) => i.values.clone(),
            Encoding::Jagged(j) => {
                let elements = self.dispatch(&j.elements).in_array("elements")?;
                let cumulative = self
                    .flat(&j.cumulative_length)
                    .in_array("cumulative_length")?;
                let jagged = JaggedValues::new(elements, cumulative.as_integers()?)?;
                return Ok(DenseArray::Jagged(jagged));
            }
        };
        DenseArray::tuples(values, array.count_per_value)
    }

    fn flat(&self, array: &ValueArray) -> Result<Values> {
        match self.dispatch(array)? {
            DenseArray::Flat { values, .. } => Ok(values),
            DenseArray::Jagged(_) => Err(Error::type_mismatch("flat array", "JaggedArray")),
        }
    }

    /// Read every part and concatenate in declaration order.
    fn read_external(&self, external: &ExternalArray) -> Result<Values> {
        let Some(store) = self.store else {
            let (uri, path) = external
                .parts
                .first()
                .map(|p| (p.uri.clone(), p.path_in_external_file.to_string()))
                .unwrap_or_default();
            return Err(Error::ExternalResourceNotFound { uri, path });
        };

        let requests = external.requests();
        let read = |(i, request): (usize, &ReadRequest<'_>)| {
            read_part(store, request).in_array(format!("part[{}]", i))
        };
        let parts: Vec<Values> = if self.config.parallel_parts && requests.len() > 1 {
            requests.par_iter().enumerate().map(read).collect::<Result<_>>()?
        } else {
            requests.iter().enumerate().map(read).collect::<Result<_>>()?
        };

        let mut out = Values::with_capacity(external.kind, external.len());
        for part in parts {
            out.append(part)?;
        }
        Ok(out)
    }
}

/// Read one window and check the store honoured the request.
fn read_part(store: &dyn ExternalStore, request: &ReadRequest<'_>) -> Result<Values> {
    debug!(%request, "reading external window");
    let values = store.read(request)?;
    if values.kind() != request.kind {
        return Err(Error::type_mismatch(request.kind, values.kind()));
    }
    if values.len() != request.len() {
        return Err(Error::shape(format!(
            "store returned {} values for a window of {}",
            values.len(),
            request.len()
        )));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ConstantArray, ExternalDataArrayPart, JaggedArray, LatticeArray};
    use crate::util::{ElementKind, Scalar};

    /// Store that returns a fixed answer regardless of the request.
    struct FixedStore(Values);

    impl ExternalStore for FixedStore {
        fn read(&self, _request: &ReadRequest<'_>) -> Result<Values> {
            Ok(self.0.clone())
        }
    }

    fn ints(v: &[i64]) -> ValueArray {
        ValueArray::from_values(Values::Integer(v.to_vec()))
    }

    #[test]
    fn test_constant() {
        let d = Resolver::new().resolve(&ValueArray::constant(7i64, 4)).unwrap();
        assert_eq!(d, DenseArray::flat(Values::Integer(vec![7; 4])));
    }

    #[test]
    fn test_tuples_from_lattice() {
        let l = ValueArray::lattice(LatticeArray::new(0.0, vec![ConstantArray::new(1.0, 6)]))
            .with_count_per_value(2);
        let d = Resolver::new().resolve(&l).unwrap();
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn test_external_without_store() {
        let e = ValueArray::external(ExternalArray::float(vec![ExternalDataArrayPart::range(
            "grid.h5", "/points", 0, 3,
        )]));
        let err = Resolver::new().resolve(&e).unwrap_err();
        assert!(matches!(err, Error::ExternalResourceNotFound { ref uri, .. } if uri == "grid.h5"));
    }

    #[test]
    fn test_store_short_read_is_shape_mismatch() {
        let store = FixedStore(Values::Float(vec![1.0, 2.0]));
        let e = ValueArray::external(ExternalArray::float(vec![ExternalDataArrayPart::range(
            "f", "/d", 0, 3,
        )]));
        let err = Resolver::with_store(&store).resolve(&e).unwrap_err();
        assert!(err.to_string().contains("part[0]"));
        assert!(matches!(err.root(), Error::ShapeMismatch(_)));
    }

    #[test]
    fn test_store_wrong_kind_is_type_mismatch() {
        let store = FixedStore(Values::Integer(vec![1, 2, 3]));
        let e = ValueArray::external(ExternalArray::float(vec![ExternalDataArrayPart::range(
            "f", "/d", 0, 3,
        )]));
        let err = Resolver::with_store(&store).resolve(&e).unwrap_err();
        assert!(matches!(err.root(), Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_mask_roundtrip() {
        let b = ValueArray::boolean_from_indices(5, ints(&[1, 3]), true);
        let expanded = Resolver::new().resolve_values(&b).unwrap();
        assert_eq!(expanded, Values::Boolean(vec![false, true, false, true, false]));

        let back = ValueArray::integer_from_mask(b);
        assert_eq!(Resolver::new().resolve_values(&back).unwrap(), Values::Integer(vec![1, 3]));
        assert_eq!(Resolver::new().len(&back).unwrap(), 2);
    }

    #[test]
    fn test_declared_index_count_checked() {
        let mask = ValueArray::from_values(Values::Boolean(vec![true, true, false]));
        let mut m = crate::array::IntegerArrayFromBooleanMaskArray::new(mask);
        m.total_index_count = Some(3);
        let a = ValueArray::new(Encoding::IntegerFromMask(m));
        assert!(matches!(Resolver::new().resolve(&a), Err(Error::MalformedArray(_))));

        let lenient = Resolver::new().config(ResolveConfig::new().verify_declared_counts(false));
        assert_eq!(lenient.resolve_values(&a).unwrap(), Values::Integer(vec![0, 1]));
    }

    #[test]
    fn test_len_verifies_declared_index_count() {
        let mask = ValueArray::from_values(Values::Boolean(vec![true, false]));
        let a = ValueArray::new(Encoding::IntegerFromMask(
            crate::array::IntegerArrayFromBooleanMaskArray::new(mask).with_total_index_count(5),
        ));
        assert_eq!(a.static_len(), Some(5));
        assert!(matches!(Resolver::new().len(&a), Err(Error::MalformedArray(_))));

        let lenient = Resolver::new().config(ResolveConfig::new().verify_declared_counts(false));
        assert_eq!(lenient.len(&a).unwrap(), 5);

        let honest = ValueArray::new(Encoding::IntegerFromMask(
            crate::array::IntegerArrayFromBooleanMaskArray::new(ValueArray::from_values(
                Values::Boolean(vec![true, false, true]),
            ))
            .with_total_index_count(2),
        ));
        assert_eq!(Resolver::new().len(&honest).unwrap(), 2);
    }

    #[test]
    fn test_jagged_bad_final_cumulative() {
        let j = ValueArray::jagged(JaggedArray::new(ValueArray::constant(1i64, 8), ints(&[3, 7])));
        let err = Resolver::new().resolve(&j).unwrap_err();
        assert!(matches!(err, Error::MalformedArray(_)));
    }

    #[test]
    fn test_index_out_of_bounds_names_indices() {
        let b = ValueArray::boolean_from_indices(3, ints(&[5]), true);
        let err = Resolver::new().resolve(&b).unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { index: 5, count: 3 }));
    }

    #[test]
    fn test_statistics_memoized() {
        let a = ints(&[3, 1, 2]);
        let resolver = Resolver::new();
        let (Cow::Borrowed(first), Cow::Borrowed(second)) =
            (resolver.statistics(&a).unwrap(), resolver.statistics(&a).unwrap())
        else {
            panic!("in-memory statistics are memoized")
        };
        assert!(std::ptr::eq(first, second));
        assert_eq!(resolver.statistics(&a).unwrap().maximum, Some(Scalar::Integer(3)));
    }

    #[test]
    fn test_external_statistics_follow_the_store() {
        let a = ValueArray::external(ExternalArray::float(vec![ExternalDataArrayPart::range(
            "f", "/d", 0, 2,
        )]));
        let low = FixedStore(Values::Float(vec![1.0, 1.0]));
        let high = FixedStore(Values::Float(vec![9.0, 9.0]));
        assert_eq!(Resolver::with_store(&low).statistics(&a).unwrap().mean, Some(1.0));
        let stats = Resolver::with_store(&high).statistics(&a).unwrap();
        assert!(matches!(stats, Cow::Owned(_)));
        assert_eq!(stats.mean, Some(9.0));
        assert!(Resolver::new().statistics(&a).is_err());
    }

    #[test]
    fn test_stale_declared_statistics() {
        let declared = ArrayStatistics {
            minimum: Some(Scalar::Integer(0)),
            ..Default::default()
        };
        let a = ints(&[3, 1, 2]).with_declared_statistics(declared);
        assert!(!Resolver::new().check_declared_statistics(&a).unwrap());
        assert!(Resolver::new().check_declared_statistics(&ints(&[1])).unwrap());
    }

    #[test]
    fn test_sub_array_of_flat_array() {
        let err = Resolver::new().sub_array(&ints(&[1]), 0).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        assert_eq!(ElementKind::Integer, ints(&[1]).element_kind());
    }
}
