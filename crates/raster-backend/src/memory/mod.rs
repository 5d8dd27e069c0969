//! In-process raster backend.
//!
//! Datasets live in memory as `f64` bands. Files are decoded once on open;
//! warps and translates produce new in-memory datasets. Derived datasets
//! share pixel data with their source through `Arc` until they are warped.

mod dataset;
pub mod geotiff;
pub mod warp;

pub use dataset::MemDataset;

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use raster_common::{BackendOp, CrsCode, GeoTransform, PixelWindow, RasterError, RasterResult};
use tracing::{debug, info};

use crate::format::RasterFormat;
use crate::handle::HandleId;
use crate::options::{TranslateOptions, WarpOptions};
use crate::RasterBackend;

/// Pure-Rust [`RasterBackend`].
///
/// # Example
///
/// ```ignore
/// let backend = Arc::new(MemoryBackend::new());
/// backend.register_drivers();
/// let id = backend.open("testdata/nasa.tif")?;
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    drivers: RwLock<HashSet<RasterFormat>>,
    /// Datasets registered under a path without a file on disk.
    virtual_files: RwLock<HashMap<String, Arc<MemDataset>>>,
    open: RwLock<HashMap<HandleId, Arc<MemDataset>>>,
    next_id: AtomicU64,
}

fn poisoned(op: BackendOp) -> RasterError {
    RasterError::backend(op, "backend state lock poisoned")
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `dataset` openable under `path`. Replaces an existing virtual file.
    pub fn insert_dataset(&self, path: impl Into<String>, dataset: MemDataset) -> RasterResult<()> {
        let path = path.into();
        debug!(path = %path, width = dataset.width(), height = dataset.height(), "Registered virtual dataset");
        self.virtual_files
            .write()
            .map_err(|_| poisoned(BackendOp::Open))?
            .insert(path, Arc::new(dataset));
        Ok(())
    }

    /// Number of datasets currently open.
    pub fn open_handles(&self) -> usize {
        self.open.read().map(|open| open.len()).unwrap_or(0)
    }

    fn insert_open(&self, op: BackendOp, dataset: Arc<MemDataset>) -> RasterResult<HandleId> {
        let id = HandleId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.open.write().map_err(|_| poisoned(op))?.insert(id, dataset);
        Ok(id)
    }

    fn get(&self, op: BackendOp, handle: HandleId) -> RasterResult<Arc<MemDataset>> {
        self.open
            .read()
            .map_err(|_| poisoned(op))?
            .get(&handle)
            .cloned()
            .ok_or_else(|| RasterError::backend(op, format!("unknown dataset handle {}", handle)))
    }

    fn driver_registered(&self, format: RasterFormat) -> RasterResult<bool> {
        Ok(self
            .drivers
            .read()
            .map_err(|_| poisoned(BackendOp::Open))?
            .contains(&format))
    }
}

impl RasterBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn register_drivers(&self) {
        if let Ok(mut drivers) = self.drivers.write() {
            drivers.extend(RasterFormat::ALL.iter().copied());
            info!(drivers = drivers.len(), "Registered raster drivers");
        }
    }

    fn open(&self, path: &str) -> RasterResult<HandleId> {
        let format = RasterFormat::from_path(path)
            .ok_or_else(|| RasterError::backend(BackendOp::Open, format!("{}: no driver for this file type", path)))?;

        if !self.driver_registered(format)? {
            return Err(RasterError::backend(
                BackendOp::Open,
                format!("{}: driver {} is not registered", path, format),
            ));
        }

        let virtual_file = self
            .virtual_files
            .read()
            .map_err(|_| poisoned(BackendOp::Open))?
            .get(path)
            .cloned();

        let dataset = match virtual_file {
            Some(dataset) => dataset,
            None => match format {
                RasterFormat::GeoTiff => Arc::new(geotiff::read_geotiff(Path::new(path))?),
            },
        };

        self.insert_open(BackendOp::Open, dataset)
    }

    fn warp(&self, source: HandleId, options: &WarpOptions) -> RasterResult<HandleId> {
        let src = self.get(BackendOp::Warp, source)?;
        let warped = warp::warp_dataset(&src, options)?;
        debug!(
            source = %source,
            width = warped.width(),
            height = warped.height(),
            crs = %warped.crs(),
            "Warped dataset"
        );
        self.insert_open(BackendOp::Warp, Arc::new(warped))
    }

    fn translate(&self, source: HandleId, _options: &TranslateOptions) -> RasterResult<HandleId> {
        let src = self.get(BackendOp::Translate, source)?;
        self.insert_open(BackendOp::Translate, src)
    }

    fn read_window(&self, handle: HandleId, band: usize, window: PixelWindow) -> RasterResult<Vec<f64>> {
        self.get(BackendOp::Read, handle)?.read_window(band, window)
    }

    fn geotransform(&self, handle: HandleId) -> RasterResult<GeoTransform> {
        Ok(self.get(BackendOp::Geotransform, handle)?.geotransform())
    }

    fn raster_size(&self, handle: HandleId) -> RasterResult<(usize, usize)> {
        let ds = self.get(BackendOp::Read, handle)?;
        Ok((ds.width(), ds.height()))
    }

    fn band_count(&self, handle: HandleId) -> RasterResult<usize> {
        Ok(self.get(BackendOp::Read, handle)?.band_count())
    }

    fn crs(&self, handle: HandleId) -> RasterResult<CrsCode> {
        Ok(self.get(BackendOp::Read, handle)?.crs())
    }

    fn close(&self, handle: HandleId) -> RasterResult<()> {
        self.open
            .write()
            .map_err(|_| poisoned(BackendOp::Close))?
            .remove(&handle)
            .map(|_| ())
            .ok_or_else(|| RasterError::backend(BackendOp::Close, format!("dataset handle {} is not open", handle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend_with(path: &str) -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.register_drivers();
        let ds = MemDataset::new(2, 2, vec![vec![1.0, 2.0, 3.0, 4.0]], GeoTransform::default(), CrsCode::Epsg3857)
            .unwrap();
        backend.insert_dataset(path, ds).unwrap();
        backend
    }

    #[test]
    fn test_open_requires_registered_driver() {
        let backend = MemoryBackend::new();
        let ds = MemDataset::new(1, 1, vec![vec![0.0]], GeoTransform::default(), CrsCode::Epsg4326).unwrap();
        backend.insert_dataset("a.tif", ds).unwrap();
        let err = backend.open("a.tif").unwrap_err();
        assert!(err.to_string().contains("not registered"));

        backend.register_drivers();
        assert!(backend.open("a.tif").is_ok());
    }

    #[test]
    fn test_open_unknown_extension() {
        let backend = backend_with("a.tif");
        let err = backend.open("a.png").unwrap_err();
        assert_eq!(err.backend_op(), Some(BackendOp::Open));
    }

    #[test]
    fn test_open_missing_file() {
        let backend = backend_with("a.tif");
        assert!(backend.open("/nonexistent/b.tif").is_err());
        assert_eq!(backend.open_handles(), 0);
    }

    #[test]
    fn test_translate_and_close() {
        let backend = backend_with("a.tif");
        let id = backend.open("a.tif").unwrap();
        let copy = backend.translate(id, &TranslateOptions::default()).unwrap();
        assert_ne!(id, copy);
        assert_eq!(backend.open_handles(), 2);

        backend.close(id).unwrap();
        assert_eq!(
            backend.read_window(copy, 1, PixelWindow::full(2, 2)).unwrap(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
        backend.close(copy).unwrap();
        assert_eq!(backend.open_handles(), 0);
    }

    #[test]
    fn test_double_close_fails() {
        let backend = backend_with("a.tif");
        let id = backend.open("a.tif").unwrap();
        backend.close(id).unwrap();
        let err = backend.close(id).unwrap_err();
        assert_eq!(err.backend_op(), Some(BackendOp::Close));
    }
}
