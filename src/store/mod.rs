//! External dataset stores.
//!
//! Implementations of [`ExternalStore`](crate::core::ExternalStore):
//!
//! - [`MemoryStore`] - datasets held in process memory
//! - [`RawFileStore`] - flat binary files described by a `catalog.json`
//!
//! [`CatalogWriter`] produces directories readable by [`RawFileStore`].

mod catalog;
mod decode;
mod file;
mod memory;
mod window;

pub use catalog::{Catalog, CatalogEntry, CatalogWriter};
pub use decode::{decode, encode};
pub use file::{FileStoreConfig, RawFileStore};
pub use memory::MemoryStore;
pub use window::{check_window, window_runs};
