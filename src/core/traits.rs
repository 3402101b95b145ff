//! Interface between the array core and external dataset stores.
//!
//! External arrays carry only addressing metadata. Resolving them goes
//! through an [`ExternalStore`] supplied by the caller.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::array::Values;
use crate::util::{ElementKind, Result};

/// Location of a dataset inside an external file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatasetPath {
    /// `/`-separated group and dataset names of a hierarchical store.
    Hierarchical(String),
    /// Field names of a flat-file record.
    Fields(Vec<String>),
}

impl DatasetPath {
    /// Non-empty group/dataset segments of a hierarchical path.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Hierarchical(p) => p.split('/').filter(|s| !s.is_empty()).collect(),
            Self::Fields(f) => f.iter().map(|s| s.as_str()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments().is_empty()
    }
}

impl From<&str> for DatasetPath {
    fn from(p: &str) -> Self {
        Self::Hierarchical(p.to_string())
    }
}

impl From<String> for DatasetPath {
    fn from(p: String) -> Self {
        Self::Hierarchical(p)
    }
}

impl fmt::Display for DatasetPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchical(p) => write!(f, "{}", p),
            Self::Fields(fields) => write!(f, "{}", fields.join(",")),
        }
    }
}

/// One hyper-rectangular read from an external dataset.
///
/// The store must return the values in `[start[i], start[i] + count[i])`
/// along every dimension `i`, flattened in row-major order.
#[derive(Clone, Copy, Debug)]
pub struct ReadRequest<'a> {
    /// Identity of the store (file) holding the dataset.
    pub uri: &'a str,
    /// Dataset inside the store.
    pub path: &'a DatasetPath,
    /// Per-dimension start offsets.
    pub start: &'a [usize],
    /// Per-dimension element counts.
    pub count: &'a [usize],
    /// Element kind the caller expects back.
    pub kind: ElementKind,
}

impl ReadRequest<'_> {
    /// Number of values covered by the window.
    pub fn len(&self) -> usize {
        self.count.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for ReadRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} start={:?} count={:?} ({})",
            self.uri, self.path, self.start, self.count, self.kind
        )
    }
}

/// Read-only access to an external binary dataset store.
///
/// Implementations must allow concurrent reads from several threads.
/// Timeouts and retries are the store's concern.
pub trait ExternalStore: Send + Sync {
    /// Read the window described by `request`.
    ///
    /// Fails with `ExternalResourceNotFound` for an unknown dataset,
    /// `ShapeMismatch` when the window does not fit the dataset extents,
    /// and `TypeMismatch` when the stored kind differs from `request.kind`.
    fn read(&self, request: &ReadRequest<'_>) -> Result<Values>;
}

impl<T: ExternalStore + ?Sized> ExternalStore for Arc<T> {
    fn read(&self, request: &ReadRequest<'_>) -> Result<Values> {
        (**self).read(request)
    }
}

impl<T: ExternalStore + ?Sized> ExternalStore for &T {
    fn read(&self, request: &ReadRequest<'_>) -> Result<Values> {
        (**self).read(request)
    }
}
