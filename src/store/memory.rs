//! In-process dataset store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::window::window_runs;
use crate::array::Values;
use crate::core::{DatasetPath, ExternalStore, ReadRequest};
use crate::util::{Dimensions, Error, Result};

struct Dataset {
    dims: Dimensions,
    values: Values,
}

/// Datasets held in memory, keyed by store URI and dataset path.
///
/// Useful for producers that assemble arrays before writing them out,
/// and for tests.
#[derive(Default)]
pub struct MemoryStore {
    datasets: RwLock<HashMap<(String, DatasetPath), Dataset>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset with shape `dims`.
    pub fn insert(
        &self,
        uri: impl Into<String>,
        path: impl Into<DatasetPath>,
        dims: impl Into<Dimensions>,
        values: Values,
    ) -> Result<()> {
        let dims = dims.into();
        if dims.num_points() != Some(values.len()) {
            return Err(Error::shape(format!(
                "{} values do not fill dataset shape {}",
                values.len(),
                dims
            )));
        }
        self.datasets
            .write()
            .insert((uri.into(), path.into()), Dataset { dims, values });
        Ok(())
    }

    /// Number of datasets.
    pub fn len(&self) -> usize {
        self.datasets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape of a dataset, if present.
    pub fn dimensions(&self, uri: &str, path: &DatasetPath) -> Option<Dimensions> {
        self.datasets
            .read()
            .get(&(uri.to_string(), path.clone()))
            .map(|d| d.dims.clone())
    }
}

impl ExternalStore for MemoryStore {
    fn read(&self, request: &ReadRequest<'_>) -> Result<Values> {
        let datasets = self.datasets.read();
        let dataset = datasets
            .get(&(request.uri.to_string(), request.path.clone()))
            .ok_or_else(|| Error::ExternalResourceNotFound {
                uri: request.uri.to_string(),
                path: request.path.to_string(),
            })?;
        if dataset.values.kind() != request.kind {
            return Err(Error::type_mismatch(request.kind, dataset.values.kind()));
        }
        let mut out = Values::with_capacity(request.kind, request.len());
        for (offset, len) in window_runs(&dataset.dims, request.start, request.count)? {
            out.append(dataset.values.slice(offset, offset + len)?)?;
        }
        Ok(out)
    }
}
