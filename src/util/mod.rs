//! Utility types shared by every array encoding.
//!
//! This module contains fundamental types used throughout the library:
//! - [`ElementKind`] / [`Scalar`] - Element families and single values
//! - [`ExternalElementType`] - Binary layouts of external datasets
//! - [`Dimensions`] - Shapes and row-major index arithmetic
//! - [`Error`] / [`Result`] - Error handling

mod element;
mod dimensions;
mod error;

pub use element::*;
pub use dimensions::*;
pub use error::*;
