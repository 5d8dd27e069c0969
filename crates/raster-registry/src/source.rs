//! Loaded raster sources and the transforms that derive new ones.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use raster_backend::{DatasetHandle, TranslateOptions, WarpOptions};
use raster_common::{BackendOp, BoundingBox, CrsCode, GeoTransform, RasterError, RasterResult, ValueRange};
use raster_style::{ColorMap, StyleDefinition};
use tracing::{debug, instrument};

use crate::config::RegistryConfig;

/// Basename of a dataset path, the key sources are cached under.
pub(crate) fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// An open raster plus the metadata needed to render it.
///
/// A source owns its dataset handle. Transforms never touch the receiver:
/// [`zoom`](Self::zoom), [`clip`](Self::clip) and [`copy`](Self::copy) each
/// return a new source around a new handle, sharing the immutable metadata.
#[derive(Debug)]
pub struct RasterSource {
    path: String,
    value_range: ValueRange,
    style: Option<Arc<StyleDefinition>>,
    color_map: Option<Arc<ColorMap>>,
    /// View extent in the source CRS
    extent: BoundingBox,
    /// Replaces the CRS the dataset declares
    source_crs: Option<CrsCode>,
    handle: DatasetHandle,
    config: Arc<RegistryConfig>,
}

impl RasterSource {
    pub(crate) fn new(
        path: impl Into<String>,
        handle: DatasetHandle,
        value_range: ValueRange,
        style: Option<StyleDefinition>,
        extent: BoundingBox,
        config: Arc<RegistryConfig>,
    ) -> Self {
        let color_map = style.as_ref().map(|s| Arc::new(s.color_map()));
        Self {
            path: path.into(),
            value_range,
            style: style.map(Arc::new),
            color_map,
            extent,
            source_crs: None,
            handle,
            config,
        }
    }

    pub(crate) fn with_source_crs(mut self, crs: Option<CrsCode>) -> Self {
        self.source_crs = crs;
        self
    }

    /// A copy of this source's metadata around another handle.
    pub fn with_handle(&self, handle: DatasetHandle, extent: BoundingBox) -> RasterSource {
        Self {
            path: self.path.clone(),
            value_range: self.value_range,
            style: self.style.clone(),
            color_map: self.color_map.clone(),
            extent,
            source_crs: self.source_crs,
            handle,
            config: Arc::clone(&self.config),
        }
    }

    /// Reproject the area under `bbox` into `crs`.
    ///
    /// `bbox` is expressed in the configured zoom extent CRS (EPSG:3857 by
    /// default). The new source covers the warped dataset's full bounds.
    #[instrument(skip(self), fields(path = %self.path))]
    pub fn zoom(&self, bbox: &BoundingBox, crs: &str) -> RasterResult<RasterSource> {
        let start = Instant::now();
        let target_crs = CrsCode::parse(crs).map_err(|e| RasterError::backend(BackendOp::Warp, e.to_string()))?;

        let options = WarpOptions::new()
            .with_source_crs(self.crs()?)
            .with_extent(*bbox, self.config.extent_crs()?)
            .with_target_crs(target_crs)
            .with_resampling(self.config.resampling);

        let handle = self.handle.warp(&options)?;
        let extent = handle.bounds()?;
        let (width, height) = handle.size()?;

        debug!(
            handle = %handle.id(),
            width = width,
            height = height,
            crs = %target_crs.epsg(),
            "Zoomed source"
        );
        crate::metrics::record_zoom(start.elapsed());

        // the warped dataset carries the target CRS itself
        Ok(self.with_handle(handle, extent).with_source_crs(None))
    }

    /// Restrict the view to `bbox` without reprojecting.
    ///
    /// `bbox` is in the source's own CRS. Pixels are not touched until the
    /// clipped source is rendered.
    pub fn clip(&self, bbox: &BoundingBox) -> RasterResult<RasterSource> {
        if !bbox.is_valid() {
            return Err(RasterError::InvalidBbox(format!("{:?}", bbox.to_array())));
        }
        let handle = self.handle.translate(&TranslateOptions::default())?;
        Ok(self.with_handle(handle, *bbox))
    }

    /// An independent in-memory copy with the same metadata.
    pub fn copy(&self) -> RasterResult<RasterSource> {
        let handle = self.handle.translate(&TranslateOptions::default())?;
        Ok(self.with_handle(handle, self.extent))
    }

    /// Close the underlying dataset now.
    pub fn release(self) -> RasterResult<()> {
        debug!(path = %self.path, handle = %self.handle.id(), "Releasing source");
        self.handle.close()
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Basename of [`path`](Self::path).
    pub fn name(&self) -> String {
        basename(&self.path)
    }

    pub fn value_range(&self) -> ValueRange {
        self.value_range
    }

    pub fn style(&self) -> Option<&StyleDefinition> {
        self.style.as_deref()
    }

    pub(crate) fn color_map(&self) -> Option<&ColorMap> {
        self.color_map.as_deref()
    }

    pub fn extent(&self) -> BoundingBox {
        self.extent
    }

    pub fn band_count(&self) -> RasterResult<usize> {
        self.handle.band_count()
    }

    /// Dataset size as `(width, height)`.
    pub fn size(&self) -> RasterResult<(usize, usize)> {
        self.handle.size()
    }

    pub fn geotransform(&self) -> RasterResult<GeoTransform> {
        self.handle.geotransform()
    }

    /// The assumed CRS when one was given at load, otherwise the dataset's own.
    pub fn crs(&self) -> RasterResult<CrsCode> {
        match self.source_crs {
            Some(crs) => Ok(crs),
            None => self.handle.crs(),
        }
    }

    pub(crate) fn handle(&self) -> &DatasetHandle {
        &self.handle
    }

    pub(crate) fn config(&self) -> &RegistryConfig {
        &self.config
    }
}
