//! Dataset catalog for flat binary files.
//!
//! A catalog lists every dataset of a store directory: which file holds
//! it, where it starts, its element layout and its shape. It is kept as
//! `catalog.json` beside the data files.

use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::decode::encode;
use crate::array::{ExternalDataArrayPart, Values};
use crate::core::DatasetPath;
use crate::util::{Dimensions, Error, ExternalElementType, Result};

/// One dataset stored contiguously in a data file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Data file, relative to the store directory.
    pub uri: String,
    pub path: DatasetPath,
    pub element_type: ExternalElementType,
    pub dims: Dimensions,
    /// Byte offset of the first element in the data file.
    #[serde(default)]
    pub offset: u64,
}

impl CatalogEntry {
    /// Size of the dataset in bytes.
    pub fn byte_len(&self) -> Option<u64> {
        let n = self.dims.num_points()?;
        (n as u64).checked_mul(self.element_type.num_bytes() as u64)
    }

    /// Part addressing the whole dataset.
    pub fn whole_part(&self) -> ExternalDataArrayPart {
        let start = vec![0; self.dims.rank()];
        ExternalDataArrayPart::new(self.uri.clone(), self.path.clone(), &start, self.dims.sizes())
    }
}

/// Every dataset of a store directory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub datasets: Vec<CatalogEntry>,
}

impl Catalog {
    /// File name of the catalog inside a store directory.
    pub const FILE_NAME: &'static str = "catalog.json";

    /// Load and check a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&text)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Write the catalog as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Reject duplicate datasets and shapes that overflow.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.datasets {
            if !seen.insert((&entry.uri, &entry.path)) {
                return Err(Error::other(format!(
                    "duplicate catalog entry {}:{}",
                    entry.uri, entry.path
                )));
            }
            if entry.dims.rank() == 0 || entry.byte_len().is_none() {
                return Err(Error::other(format!(
                    "catalog entry {}:{} has invalid shape {}",
                    entry.uri, entry.path, entry.dims
                )));
            }
        }
        Ok(())
    }

    /// Look up a dataset.
    pub fn find(&self, uri: &str, path: &DatasetPath) -> Option<&CatalogEntry> {
        self.datasets.iter().find(|e| e.uri == uri && &e.path == path)
    }
}

/// Writes datasets into flat files of a store directory and records them
/// in a catalog.
pub struct CatalogWriter {
    root: PathBuf,
    catalog: Catalog,
}

impl CatalogWriter {
    /// Start writing into `root`, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            catalog: Catalog::default(),
        })
    }

    /// Append `values` to data file `uri` and return a part addressing
    /// the whole dataset.
    pub fn add_dataset(
        &mut self,
        uri: &str,
        path: impl Into<DatasetPath>,
        element_type: ExternalElementType,
        dims: impl Into<Dimensions>,
        values: &Values,
    ) -> Result<ExternalDataArrayPart> {
        let path = path.into();
        let dims = dims.into();
        if dims.num_points() != Some(values.len()) {
            return Err(Error::shape(format!(
                "{} values do not fill dataset shape {}",
                values.len(),
                dims
            )));
        }
        if self.catalog.find(uri, &path).is_some() {
            return Err(Error::other(format!("dataset {}:{} already written", uri, path)));
        }
        let bytes = encode(element_type, values)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(uri))?;
        let offset = file.metadata()?.len();
        file.write_all(&bytes)?;

        let entry = CatalogEntry {
            uri: uri.to_string(),
            path,
            element_type,
            dims,
            offset,
        };
        let part = entry.whole_part();
        self.catalog.datasets.push(entry);
        Ok(part)
    }

    /// Write `catalog.json` and return the catalog.
    pub fn finish(self) -> Result<Catalog> {
        self.catalog.save(self.root.join(Catalog::FILE_NAME))?;
        Ok(self.catalog)
    }
}
