//! Render pipeline: turn a source's view extent into an image.
//!
//! Two strategies produce the samples:
//!
//! - [`RenderStrategy::Warp`] warps the view to the output size through the
//!   backend and reads the temporary dataset whole.
//! - [`RenderStrategy::Windowed`] reads only the pixel window under the view
//!   extent and resamples it to the output size by nearest neighbour.
//!
//! Single bands are drawn through the style's color map, or as grayscale when
//! unstyled and already in byte range. Three bands pass straight through as RGB.

use std::time::Instant;

use raster_backend::{DatasetHandle, WarpOptions};
use raster_common::{PixelWindow, RasterError, RasterResult};
use renderer::{draw_color_map, draw_grayscale, draw_rgb, resample_nearest, RenderedImage};
use tracing::{debug, instrument};

use crate::config::RenderStrategy;
use crate::geometry;
use crate::source::RasterSource;

/// Samples of every band, row-major, all `width * height` long.
struct Samples {
    bands: Vec<Vec<f64>>,
    width: usize,
    height: usize,
}

impl RasterSource {
    /// Render the view extent at `width` x `height` with the configured strategy.
    pub fn render(&self, width: u32, height: u32) -> RasterResult<RenderedImage> {
        self.render_with(width, height, self.config().render_strategy)
    }

    /// Render the view extent at `width` x `height` with an explicit strategy.
    #[instrument(skip(self), fields(path = %self.path()))]
    pub fn render_with(&self, width: u32, height: u32, strategy: RenderStrategy) -> RasterResult<RenderedImage> {
        let start = Instant::now();
        let result = self.render_inner(width, height, strategy);
        crate::metrics::record_render(strategy, start.elapsed(), result.as_ref().err());

        match &result {
            Ok(image) => debug!(
                strategy = %strategy,
                color = ?image.color_type(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Rendered tile"
            ),
            Err(e) => debug!(strategy = %strategy, error = %e, "Render failed"),
        }
        result
    }

    fn render_inner(&self, width: u32, height: u32, strategy: RenderStrategy) -> RasterResult<RenderedImage> {
        self.check_size(width, height)?;
        let (width, height) = (width as usize, height as usize);

        let samples = match strategy {
            RenderStrategy::Warp => self.warp_then_read(width, height)?,
            RenderStrategy::Windowed => self.windowed_read(width, height)?,
        };
        self.draw(samples)
    }

    fn check_size(&self, width: u32, height: u32) -> RasterResult<()> {
        let max = self.config().max_render_size;
        let reason = if width == 0 || height == 0 {
            "width and height must be > 0".to_string()
        } else if width > max || height > max {
            format!("exceeds the maximum of {}", max)
        } else {
            return Ok(());
        };
        Err(RasterError::InvalidSize { width, height, reason })
    }

    /// Warp the view extent to the output size, then read the temporary dataset.
    fn warp_then_read(&self, width: usize, height: usize) -> RasterResult<Samples> {
        let crs = self.crs()?;
        let options = WarpOptions::new()
            .with_target_size(width, height)
            .with_source_crs(crs)
            .with_extent(self.extent(), crs)
            .with_resampling(self.config().resampling);

        let warped = self.handle().warp(&options)?;
        debug!(handle = %warped.id(), width = width, height = height, "Warped view for render");

        let read = self.read_full(&warped, width, height);
        let closed = warped.close();
        let samples = read?;
        closed?;
        Ok(samples)
    }

    fn read_full(&self, handle: &DatasetHandle, width: usize, height: usize) -> RasterResult<Samples> {
        let band_count = self.checked_band_count(handle.band_count()?)?;
        let window = PixelWindow::full(width, height);
        let bands = (1..=band_count)
            .map(|band| handle.read_window(band, window))
            .collect::<RasterResult<Vec<_>>>()?;
        Ok(Samples { bands, width, height })
    }

    /// Read the pixel window under the view extent, then resample to the output size.
    fn windowed_read(&self, width: usize, height: usize) -> RasterResult<Samples> {
        let handle = self.handle();
        let band_count = self.checked_band_count(handle.band_count()?)?;
        let (raster_width, raster_height) = handle.size()?;
        let window = geometry::resolve(&self.extent(), &handle.geotransform()?, raster_width, raster_height)?;
        debug!(
            x_offset = window.x_offset,
            y_offset = window.y_offset,
            window_width = window.width,
            window_height = window.height,
            "Resolved read window"
        );

        let bands = (1..=band_count)
            .map(|band| {
                let samples = handle.read_window(band, window)?;
                Ok(resample_nearest(&samples, window.width, window.height, width, height))
            })
            .collect::<RasterResult<Vec<_>>>()?;
        Ok(Samples { bands, width, height })
    }

    /// Only single-band and three-band sources can be drawn.
    fn checked_band_count(&self, bands: usize) -> RasterResult<usize> {
        match bands {
            1 | 3 => Ok(bands),
            _ => Err(RasterError::UnsupportedBandCount {
                path: self.path().to_string(),
                bands,
            }),
        }
    }

    fn draw(&self, samples: Samples) -> RasterResult<RenderedImage> {
        let Samples { bands, width, height } = samples;
        match bands.as_slice() {
            [band] => match self.color_map() {
                Some(color_map) => Ok(draw_color_map(band, width, height, color_map)?.into()),
                None => {
                    let range = self.value_range();
                    if !range.is_byte() {
                        return Err(RasterError::UnsupportedValueRange {
                            path: self.path().to_string(),
                            min: range.min,
                            max: range.max,
                        });
                    }
                    Ok(draw_grayscale(band, width, height, range)?.into())
                }
            },
            [r, g, b] => Ok(draw_rgb([r.as_slice(), g.as_slice(), b.as_slice()], width, height)?.into()),
            _ => Err(RasterError::UnsupportedBandCount {
                path: self.path().to_string(),
                bands: bands.len(),
            }),
        }
    }
}
