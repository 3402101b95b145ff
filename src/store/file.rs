//! Store backed by flat binary files described by a catalog.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use super::catalog::{Catalog, CatalogEntry};
use super::decode::decode;
use super::window::window_runs;
use crate::array::Values;
use crate::core::{DatasetPath, ExternalStore, ReadRequest, WindowCache, WindowKey};
use crate::util::{Error, Result};

/// Options for [`RawFileStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStoreConfig {
    /// Memory-map data files (requires the `mmap` feature).
    pub use_mmap: bool,
    /// Budget of the decoded-window cache in bytes; 0 disables it.
    pub cache_bytes: usize,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            use_mmap: true,
            cache_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Open data file.
enum Source {
    /// Memory-mapped file (preferred for large files)
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
    /// Buffered file access (fallback)
    File { file: Mutex<File>, size: u64 },
}

impl Source {
    fn open(path: &Path, use_mmap: bool) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        #[cfg(feature = "mmap")]
        if use_mmap && size > 0 {
            // Safety: the file is opened read-only and stores never write to it
            let mmap = unsafe { Mmap::map(&file) }?;
            return Ok(Self::Mmap(mmap));
        }
        #[cfg(not(feature = "mmap"))]
        let _ = use_mmap;
        Ok(Self::File { file: Mutex::new(file), size })
    }

    fn len(&self) -> u64 {
        match self {
            #[cfg(feature = "mmap")]
            Self::Mmap(m) => m.len() as u64,
            Self::File { size, .. } => *size,
        }
    }

    /// Read `len` bytes at `pos`. The caller checks bounds.
    fn read_at(&self, pos: u64, len: usize) -> Result<Vec<u8>> {
        match self {
            #[cfg(feature = "mmap")]
            Self::Mmap(m) => Ok(m[pos as usize..pos as usize + len].to_vec()),
            Self::File { file, .. } => {
                let mut f = file.lock();
                f.seek(SeekFrom::Start(pos))?;
                let mut buf = vec![0u8; len];
                f.read_exact(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

/// Read-only store over a directory of flat binary data files.
///
/// The directory holds a `catalog.json` listing every dataset; files are
/// opened lazily on first access and shared between readers.
pub struct RawFileStore {
    root: PathBuf,
    entries: HashMap<(String, DatasetPath), CatalogEntry>,
    sources: RwLock<HashMap<String, Arc<Source>>>,
    cache: Option<WindowCache>,
    config: FileStoreConfig,
}

impl RawFileStore {
    /// Open the store in `root` with default settings.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        Self::open_opts(root, FileStoreConfig::default())
    }

    /// Open the store in `root`.
    pub fn open_opts(root: impl AsRef<Path>, config: FileStoreConfig) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let catalog = Catalog::load(root.join(Catalog::FILE_NAME))?;
        debug!(root = %root.display(), datasets = catalog.datasets.len(), "opened file store");
        let entries = catalog
            .datasets
            .into_iter()
            .map(|e| ((e.uri.clone(), e.path.clone()), e))
            .collect();
        Ok(Self {
            root,
            entries,
            sources: RwLock::new(HashMap::new()),
            cache: (config.cache_bytes > 0).then(|| WindowCache::new(config.cache_bytes)),
            config,
        })
    }

    /// Store directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of catalogued datasets.
    pub fn num_datasets(&self) -> usize {
        self.entries.len()
    }

    /// Catalog entry of a dataset.
    pub fn entry(&self, uri: &str, path: &DatasetPath) -> Option<&CatalogEntry> {
        self.entries.get(&(uri.to_string(), path.clone()))
    }

    /// Decoded-window cache, if enabled.
    pub fn cache(&self) -> Option<&WindowCache> {
        self.cache.as_ref()
    }

    fn source(&self, uri: &str) -> Result<Arc<Source>> {
        if let Some(s) = self.sources.read().get(uri) {
            return Ok(Arc::clone(s));
        }
        let path = self.root.join(uri);
        let source = Source::open(&path, self.config.use_mmap).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::ExternalResourceNotFound {
                    uri: uri.to_string(),
                    path: path.display().to_string(),
                }
            } else {
                Error::Io(e)
            }
        })?;
        let mut sources = self.sources.write();
        let source = sources
            .entry(uri.to_string())
            .or_insert_with(|| Arc::new(source));
        Ok(Arc::clone(source))
    }

    fn read_uncached(&self, entry: &CatalogEntry, request: &ReadRequest<'_>) -> Result<Values> {
        let runs = window_runs(&entry.dims, request.start, request.count)?;
        let source = self.source(&entry.uri)?;

        let width = entry.element_type.num_bytes();
        let end = entry.byte_len().and_then(|n| n.checked_add(entry.offset));
        if end.map_or(true, |end| end > source.len()) {
            return Err(Error::shape(format!(
                "dataset {}:{} extends past the end of its {}-byte file",
                entry.uri,
                entry.path,
                source.len()
            )));
        }

        let mut out = Values::with_capacity(request.kind, request.len());
        for (offset, len) in runs {
            let bytes = source.read_at(entry.offset + (offset * width) as u64, len * width)?;
            out.append(decode(entry.element_type, &bytes)?)?;
        }
        Ok(out)
    }
}

impl ExternalStore for RawFileStore {
    fn read(&self, request: &ReadRequest<'_>) -> Result<Values> {
        let entry = self
            .entry(request.uri, request.path)
            .ok_or_else(|| Error::ExternalResourceNotFound {
                uri: request.uri.to_string(),
                path: request.path.to_string(),
            })?;
        let stored = entry.element_type.kind();
        if stored != request.kind {
            return Err(Error::type_mismatch(request.kind, stored));
        }

        let Some(cache) = &self.cache else {
            return self.read_uncached(entry, request);
        };
        let key = WindowKey::from_request(request);
        if let Some(hit) = cache.get(&key) {
            return Ok((*hit).clone());
        }
        let values = self.read_uncached(entry, request)?;
        cache.insert(key, Arc::new(values.clone()));
        Ok(values)
    }
}
