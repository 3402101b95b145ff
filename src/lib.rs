//! # emlarray
//!
//! Encoded value arrays for data-object exchange formats.
//!
//! Large boolean, integer, float and string arrays are rarely stored
//! element by element. An array is instead described by one of a closed
//! set of encodings: a constant fill, an affine lattice, a pointer into an
//! external binary dataset, a boolean expanded from sparse indices (or
//! indices extracted from a boolean mask), inline tokens, or a jagged
//! list-of-lists over any of these. A [`Resolver`](array::Resolver) turns
//! any encoding into its dense logical content.
//!
//! ## Modules
//!
//! - [`util`] - Element kinds, external element types, shapes, errors
//! - [`core`] - External store interface, resolve settings, statistics
//! - [`array`] - Array encodings, resolved form, resolver
//! - [`store`] - In-memory and flat-file external stores
//! - [`collection`] - Column / nested table wrappers
//!
//! ## Example
//!
//! ```ignore
//! use emlarray::prelude::*;
//!
//! let lattice = LatticeArray::new(0i64, vec![
//!     ConstantArray::new(10i64, 2),
//!     ConstantArray::new(1i64, 3),
//! ]);
//! let dense = Resolver::new().resolve(&ValueArray::lattice(lattice))?;
//! assert_eq!(dense.values(), Some(&Values::Integer(vec![0, 1, 2, 10, 11, 12])));
//! ```

pub mod util;
pub mod core;
pub mod array;
pub mod store;
pub mod collection;

// Re-export commonly used types
pub use util::{ElementKind, Error, Result, Scalar};
pub use array::{DenseArray, Resolver, ValueArray, Values};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Dimensions, ElementKind, Error, ExternalElementType, Result, Scalar};
    pub use crate::core::{ArrayStatistics, DatasetPath, ExternalStore, ReadRequest, ResolveConfig};
    pub use crate::array::*;
    pub use crate::store::{FileStoreConfig, MemoryStore, RawFileStore};
    pub use crate::collection::{Column, NestedTable};
}
