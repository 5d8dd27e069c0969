//! In-memory raster dataset.

use raster_common::{BackendOp, CrsCode, GeoTransform, PixelWindow, RasterError, RasterResult};

/// Pixel data plus georeferencing for one dataset.
///
/// Bands are stored row-major as `f64`, whatever the source sample type was.
#[derive(Debug, Clone, PartialEq)]
pub struct MemDataset {
    width: usize,
    height: usize,
    bands: Vec<Vec<f64>>,
    geotransform: GeoTransform,
    crs: CrsCode,
}

impl MemDataset {
    /// Build a dataset, checking every band has `width * height` samples.
    pub fn new(
        width: usize,
        height: usize,
        bands: Vec<Vec<f64>>,
        geotransform: GeoTransform,
        crs: CrsCode,
    ) -> RasterResult<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::backend(
                BackendOp::Open,
                format!("invalid raster size {}x{}", width, height),
            ));
        }
        for (i, band) in bands.iter().enumerate() {
            if band.len() != width * height {
                return Err(RasterError::backend(
                    BackendOp::Open,
                    format!(
                        "band {} has {} samples, expected {}x{}={}",
                        i + 1,
                        band.len(),
                        width,
                        height,
                        width * height
                    ),
                ));
            }
        }
        Ok(Self {
            width,
            height,
            bands,
            geotransform,
            crs,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn geotransform(&self) -> GeoTransform {
        self.geotransform
    }

    pub fn crs(&self) -> CrsCode {
        self.crs
    }

    pub(crate) fn bands(&self) -> &[Vec<f64>] {
        &self.bands
    }

    /// Copy one band (1-based) over a window.
    pub fn read_window(&self, band: usize, window: PixelWindow) -> RasterResult<Vec<f64>> {
        let data = band
            .checked_sub(1)
            .and_then(|i| self.bands.get(i))
            .ok_or_else(|| {
                RasterError::backend(
                    BackendOp::Read,
                    format!("band {} out of range (dataset has {})", band, self.bands.len()),
                )
            })?;

        if !window.fits_within(self.width, self.height) {
            return Err(RasterError::backend(
                BackendOp::Read,
                format!(
                    "window {}x{}+{}+{} outside {}x{} raster",
                    window.width, window.height, window.x_offset, window.y_offset, self.width, self.height
                ),
            ));
        }

        let mut out = Vec::with_capacity(window.len());
        for row in window.y_offset..window.y_offset + window.height {
            let start = row * self.width + window.x_offset;
            out.extend_from_slice(&data[start..start + window.width]);
        }
        Ok(out)
    }
}
