//! Owned dataset handles.

use std::fmt;
use std::sync::Arc;

use raster_common::{BoundingBox, CrsCode, GeoTransform, PixelWindow, RasterResult};
use tracing::{debug, warn};

use crate::options::{TranslateOptions, WarpOptions};
use crate::RasterBackend;

/// Backend-assigned dataset identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An open dataset.
///
/// The handle is the single owner of the backend resource: it is not `Clone`,
/// derived datasets get their own handle, and the resource is closed exactly
/// once, either through [`DatasetHandle::close`] or on drop.
pub struct DatasetHandle {
    id: HandleId,
    backend: Arc<dyn RasterBackend>,
    closed: bool,
}

impl DatasetHandle {
    /// Open `path` through `backend`.
    pub fn open(backend: &Arc<dyn RasterBackend>, path: &str) -> RasterResult<Self> {
        let id = backend.open(path)?;
        debug!(backend = backend.name(), path = %path, handle = %id, "Opened dataset");
        Ok(Self::from_id(Arc::clone(backend), id))
    }

    /// Wrap an id the backend already handed out. The handle takes ownership.
    pub fn from_id(backend: Arc<dyn RasterBackend>, id: HandleId) -> Self {
        Self {
            id,
            backend,
            closed: false,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    pub fn backend(&self) -> &Arc<dyn RasterBackend> {
        &self.backend
    }

    /// Warp into a new dataset. `self` is untouched.
    pub fn warp(&self, options: &WarpOptions) -> RasterResult<DatasetHandle> {
        let id = self.backend.warp(self.id, options)?;
        Ok(Self::from_id(Arc::clone(&self.backend), id))
    }

    /// Copy into a new dataset. `self` is untouched.
    pub fn translate(&self, options: &TranslateOptions) -> RasterResult<DatasetHandle> {
        let id = self.backend.translate(self.id, options)?;
        Ok(Self::from_id(Arc::clone(&self.backend), id))
    }

    pub fn read_window(&self, band: usize, window: PixelWindow) -> RasterResult<Vec<f64>> {
        self.backend.read_window(self.id, band, window)
    }

    /// Read a whole band.
    pub fn read_band(&self, band: usize) -> RasterResult<Vec<f64>> {
        let (width, height) = self.size()?;
        self.read_window(band, PixelWindow::full(width, height))
    }

    pub fn geotransform(&self) -> RasterResult<GeoTransform> {
        self.backend.geotransform(self.id)
    }

    pub fn size(&self) -> RasterResult<(usize, usize)> {
        self.backend.raster_size(self.id)
    }

    pub fn band_count(&self) -> RasterResult<usize> {
        self.backend.band_count(self.id)
    }

    pub fn crs(&self) -> RasterResult<CrsCode> {
        self.backend.crs(self.id)
    }

    /// Full georeferenced bounds of the dataset.
    pub fn bounds(&self) -> RasterResult<BoundingBox> {
        let (width, height) = self.size()?;
        Ok(self.geotransform()?.bounds(width, height))
    }

    /// Close now and report the backend's answer.
    pub fn close(mut self) -> RasterResult<()> {
        self.closed = true;
        self.backend.close(self.id)
    }
}

impl Drop for DatasetHandle {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.backend.close(self.id) {
            warn!(handle = %self.id, error = %e, "Failed to close dataset on drop");
        }
    }
}

impl fmt::Debug for DatasetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetHandle")
            .field("id", &self.id)
            .field("backend", &self.backend.name())
            .finish()
    }
}
