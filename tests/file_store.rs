//! Integration tests for the catalog-backed flat file store.

use std::fs;

use emlarray::array::{ExternalArray, ExternalDataArrayPart, Resolver, ValueArray, Values};
use emlarray::core::{DatasetPath, ExternalStore, ReadRequest};
use emlarray::store::{Catalog, CatalogWriter, FileStoreConfig, RawFileStore};
use emlarray::util::{ElementKind, ExternalElementType};
use emlarray::Error;

use tempfile::TempDir;

/// Store directory with a 4 x 3 big-endian integer grid and a float column
/// sharing one data file.
fn write_store() -> (TempDir, Vec<ExternalDataArrayPart>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut writer = CatalogWriter::create(dir.path()).expect("Failed to create writer");
    let grid = writer
        .add_dataset(
            "data.bin",
            "/grid/cells",
            ExternalElementType::Int32BE,
            (4, 3),
            &Values::Integer((0..12).map(|i| i * 100 - 300).collect()),
        )
        .expect("Failed to write grid");
    let depth = writer
        .add_dataset(
            "data.bin",
            "/well/depth",
            ExternalElementType::Float32LE,
            5usize,
            &Values::Float(vec![100.0, 100.5, 101.0, f64::NAN, 102.0]),
        )
        .expect("Failed to write depth");
    let catalog = writer.finish().expect("Failed to write catalog");
    assert_eq!(catalog.datasets.len(), 2);
    assert_eq!(catalog.datasets[1].offset, 48);
    (dir, vec![grid, depth])
}

fn configs() -> Vec<FileStoreConfig> {
    vec![
        FileStoreConfig::default(),
        FileStoreConfig { use_mmap: false, cache_bytes: 0 },
    ]
}

#[test]
fn test_catalog_file_written() {
    let (dir, _) = write_store();
    let catalog = Catalog::load(dir.path().join(Catalog::FILE_NAME)).unwrap();
    let entry = catalog
        .find("data.bin", &DatasetPath::from("/grid/cells"))
        .expect("grid entry");
    assert_eq!(entry.element_type, ExternalElementType::Int32BE);
    assert_eq!(entry.dims.sizes(), &[4, 3]);

    let text = fs::read_to_string(dir.path().join(Catalog::FILE_NAME)).unwrap();
    assert!(text.contains("arrayOfInt32BE"));
    assert_eq!(fs::metadata(dir.path().join("data.bin")).unwrap().len(), 48 + 20);
}

#[test]
fn test_resolve_whole_datasets() {
    let (dir, parts) = write_store();
    for config in configs() {
        let store = RawFileStore::open_opts(dir.path(), config).unwrap();
        assert_eq!(store.num_datasets(), 2);
        let resolver = Resolver::with_store(&store);

        let grid = ValueArray::external(ExternalArray::integer(vec![parts[0].clone()], i64::MIN));
        let values = resolver.resolve_values(&grid).unwrap();
        assert_eq!(values, Values::Integer((0..12).map(|i| i * 100 - 300).collect()));

        let depth = ValueArray::external(ExternalArray::float(vec![parts[1].clone()]));
        let stats = resolver.statistics(&depth).unwrap();
        assert_eq!(stats.valid_value_count, Some(4));
        assert_eq!(stats.mean, Some(100.875));
    }
}

#[test]
fn test_resolve_windows_and_parts() {
    let (dir, _) = write_store();
    for config in configs() {
        let store = RawFileStore::open_opts(dir.path(), config).unwrap();
        // Columns 1..3 of rows 2..4, then the start of the first row
        let a = ValueArray::external(ExternalArray::integer(
            vec![
                ExternalDataArrayPart::new("data.bin", "/grid/cells", &[2, 1], &[2, 2]),
                ExternalDataArrayPart::new("data.bin", "/grid/cells", &[0, 0], &[1, 2]),
            ],
            -1,
        ))
        .with_count_per_value(2);
        let dense = Resolver::with_store(&store).resolve(&a).unwrap();
        assert_eq!(dense.len(), 3);
        assert_eq!(
            dense.values().unwrap(),
            &Values::Integer(vec![400, 500, 700, 800, -300, -200])
        );
    }
}

#[test]
fn test_cache_reuses_windows() {
    let (dir, parts) = write_store();
    let store = RawFileStore::open(dir.path()).unwrap();
    let request = parts[1].request(ElementKind::Float);

    let first = store.read(&request).unwrap();
    let cache = store.cache().expect("cache enabled by default");
    assert_eq!(cache.len(), 1);

    let second = store.read(&request).unwrap();
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_missing_dataset_and_file() {
    let (dir, _) = write_store();
    let store = RawFileStore::open(dir.path()).unwrap();
    let path = DatasetPath::from("/nope");
    let request = ReadRequest {
        uri: "data.bin",
        path: &path,
        start: &[0],
        count: &[1],
        kind: ElementKind::Float,
    };
    assert!(matches!(store.read(&request), Err(Error::ExternalResourceNotFound { .. })));

    fs::remove_file(dir.path().join("data.bin")).unwrap();
    let store = RawFileStore::open(dir.path()).unwrap();
    let a = ValueArray::external(ExternalArray::float(vec![ExternalDataArrayPart::range(
        "data.bin",
        "/well/depth",
        0,
        2,
    )]));
    let err = Resolver::with_store(&store).resolve(&a).unwrap_err();
    assert!(matches!(err.root(), Error::ExternalResourceNotFound { .. }));
}

#[test]
fn test_shape_and_type_errors() {
    let (dir, _) = write_store();
    let store = RawFileStore::open(dir.path()).unwrap();
    let resolver = Resolver::with_store(&store);

    let past_end = ValueArray::external(ExternalArray::integer(
        vec![ExternalDataArrayPart::new("data.bin", "/grid/cells", &[3, 0], &[2, 3])],
        -1,
    ));
    let err = resolver.resolve(&past_end).unwrap_err();
    assert!(matches!(err.root(), Error::ShapeMismatch(_)));

    let wrong_rank = ValueArray::external(ExternalArray::integer(
        vec![ExternalDataArrayPart::range("data.bin", "/grid/cells", 0, 3)],
        -1,
    ));
    assert!(matches!(
        resolver.resolve(&wrong_rank).unwrap_err().root(),
        Error::ShapeMismatch(_)
    ));

    let wrong_kind = ValueArray::external(ExternalArray::boolean(vec![
        ExternalDataArrayPart::range("data.bin", "/well/depth", 0, 2),
    ]));
    assert!(matches!(
        resolver.resolve(&wrong_kind).unwrap_err().root(),
        Error::TypeMismatch { .. }
    ));
}

#[test]
fn test_truncated_file() {
    let (dir, parts) = write_store();
    let data = dir.path().join("data.bin");
    let bytes = fs::read(&data).unwrap();
    fs::write(&data, &bytes[..bytes.len() - 4]).unwrap();

    for config in configs() {
        let store = RawFileStore::open_opts(dir.path(), config).unwrap();
        let err = store.read(&parts[1].request(ElementKind::Float)).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch(_)));
    }
}

#[test]
fn test_open_without_catalog() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(RawFileStore::open(dir.path()), Err(Error::Io(_))));

    fs::write(dir.path().join(Catalog::FILE_NAME), "{ not json").unwrap();
    assert!(matches!(RawFileStore::open(dir.path()), Err(Error::Json(_))));
}
