//! MemoryBackend tests through the public handle API.

use std::sync::Arc;

use raster_backend::{DatasetHandle, MemDataset, MemoryBackend, RasterBackend, TranslateOptions, WarpOptions};
use raster_common::{BackendOp, BoundingBox, CrsCode, GeoTransform, PixelWindow};
use test_utils::{create_byte_ramp, create_rgb_bands, write_geotiff, GeoRef, SampleType};

fn setup() -> (Arc<MemoryBackend>, Arc<dyn RasterBackend>) {
    let memory = Arc::new(MemoryBackend::new());
    memory.register_drivers();
    let backend: Arc<dyn RasterBackend> = memory.clone();
    (memory, backend)
}

// ============================================================================
// GeoTIFF decoding
// ============================================================================

#[test]
fn test_open_single_band_geotiff() {
    let (memory, backend) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ramp.tif");
    let georef = GeoRef::from_bbox((1000.0, 2000.0, 1160.0, 2080.0), 16, 8, 3857);
    write_geotiff(&path, 16, 8, &[create_byte_ramp(16, 8)], georef, SampleType::U8).unwrap();

    let handle = DatasetHandle::open(&backend, path.to_str().unwrap()).unwrap();
    assert_eq!(handle.size().unwrap(), (16, 8));
    assert_eq!(handle.band_count().unwrap(), 1);
    assert_eq!(handle.crs().unwrap(), CrsCode::Epsg3857);
    assert_eq!(handle.geotransform().unwrap(), GeoTransform::new(1000.0, 2080.0, 10.0, -10.0));
    assert_eq!(handle.bounds().unwrap(), BoundingBox::new(1000.0, 2000.0, 1160.0, 2080.0));

    let band = handle.read_band(1).unwrap();
    assert_eq!(band, create_byte_ramp(16, 8));

    drop(handle);
    assert_eq!(memory.open_handles(), 0);
}

#[test]
fn test_open_float_geotiff_in_lonlat() {
    let (_memory, backend) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("float.tif");
    let band: Vec<f64> = (0..4).map(|v| v as f64 * 0.5 - 1.0).collect();
    let georef = GeoRef::from_bbox((10.0, 40.0, 12.0, 42.0), 2, 2, 4326);
    write_geotiff(&path, 2, 2, &[band.clone()], georef, SampleType::F32).unwrap();

    let handle = DatasetHandle::open(&backend, path.to_str().unwrap()).unwrap();
    assert_eq!(handle.crs().unwrap(), CrsCode::Epsg4326);
    assert_eq!(handle.read_band(1).unwrap(), band);
}

#[test]
fn test_open_rgb_geotiff_splits_bands() {
    let (_memory, backend) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.tif");
    let bands = create_rgb_bands(4, 4);
    let georef = GeoRef::from_bbox((0.0, 0.0, 4.0, 4.0), 4, 4, 3857);
    write_geotiff(&path, 4, 4, &bands, georef, SampleType::U8).unwrap();

    let handle = DatasetHandle::open(&backend, path.to_str().unwrap()).unwrap();
    assert_eq!(handle.band_count().unwrap(), 3);
    for (i, expected) in bands.iter().enumerate() {
        assert_eq!(&handle.read_band(i + 1).unwrap(), expected);
    }
}

#[test]
fn test_open_garbage_file_fails() {
    let (memory, backend) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.tif");
    std::fs::write(&path, b"definitely not a tiff").unwrap();

    let err = DatasetHandle::open(&backend, path.to_str().unwrap()).unwrap_err();
    assert_eq!(err.backend_op(), Some(BackendOp::Open));
    assert_eq!(memory.open_handles(), 0);
}

// ============================================================================
// Handle lifecycle
// ============================================================================

fn ramp_dataset() -> MemDataset {
    MemDataset::new(
        8,
        8,
        vec![create_byte_ramp(8, 8)],
        GeoTransform::new(0.0, 8.0, 1.0, -1.0),
        CrsCode::Epsg3857,
    )
    .unwrap()
}

#[test]
fn test_derived_handles_are_independent() {
    let (memory, backend) = setup();
    memory.insert_dataset("ramp.tif", ramp_dataset()).unwrap();

    let source = DatasetHandle::open(&backend, "ramp.tif").unwrap();
    let copy = source.translate(&TranslateOptions::default()).unwrap();
    let warped = source.warp(&WarpOptions::new().with_target_size(4, 4)).unwrap();
    assert_eq!(memory.open_handles(), 3);

    source.close().unwrap();
    assert_eq!(copy.read_band(1).unwrap(), create_byte_ramp(8, 8));
    assert_eq!(warped.size().unwrap(), (4, 4));

    drop(copy);
    drop(warped);
    assert_eq!(memory.open_handles(), 0);
}

#[test]
fn test_warp_failure_leaves_no_handle() {
    let (memory, backend) = setup();
    memory.insert_dataset("ramp.tif", ramp_dataset()).unwrap();
    let source = DatasetHandle::open(&backend, "ramp.tif").unwrap();

    let far = BoundingBox::new(1.0e6, 1.0e6, 2.0e6, 2.0e6);
    let err = source.warp(&WarpOptions::new().with_extent(far, CrsCode::Epsg3857)).unwrap_err();
    assert_eq!(err.backend_op(), Some(BackendOp::Warp));
    assert_eq!(memory.open_handles(), 1);
}

#[test]
fn test_read_window_through_handle() {
    let (memory, backend) = setup();
    memory.insert_dataset("ramp.tif", ramp_dataset()).unwrap();
    let handle = DatasetHandle::open(&backend, "ramp.tif").unwrap();

    let full = create_byte_ramp(8, 8);
    let window = handle.read_window(1, PixelWindow::new(2, 3, 2, 1)).unwrap();
    assert_eq!(window, vec![full[3 * 8 + 2], full[3 * 8 + 3]]);
    assert!(handle.read_window(2, PixelWindow::full(8, 8)).is_err());
}
