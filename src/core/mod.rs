//! Core layer - store interface, settings and derived statistics.
//!
//! This module provides:
//! - [`ExternalStore`] / [`ReadRequest`] - Addressing contract for external datasets
//! - [`ResolveConfig`] - Validation and resolution options
//! - [`ArrayStatistics`] - Summary statistics over resolved values
//! - [`WindowCache`] - Size-bounded cache of decoded windows

mod traits;
mod config;
mod statistics;
mod cache;

pub use traits::{DatasetPath, ExternalStore, ReadRequest};
pub use config::ResolveConfig;
pub use statistics::ArrayStatistics;
pub use cache::{approx_size, WindowCache, WindowKey};
