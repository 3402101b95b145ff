//! Attribution wrappers around value arrays.
//!
//! A [`Column`] gives an array a title, a property kind and a unit of
//! measure; a [`NestedTable`] groups columns that share a row count. Both
//! only carry the array: resolution goes through a
//! [`Resolver`](crate::array::Resolver) like any other array.
//!
//! ## Example
//!
//! ```ignore
//! use emlarray::collection::{Column, NestedTable};
//! use emlarray::array::{Resolver, ValueArray};
//!
//! let table = NestedTable::builder()
//!     .column(Column::new("depth", "length", ValueArray::constant(0.5, 4)).with_uom("m"))
//!     .column(Column::new("flag", "discrete", ValueArray::constant(true, 4)))
//!     .build()?;
//! let depth = table.column("depth").unwrap().resolve(&Resolver::new())?;
//! ```

mod table;

pub use table::*;
