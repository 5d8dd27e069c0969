//! Rendered tile images.

use image::{GrayImage, RgbImage, RgbaImage};
use raster_common::RasterResult;

use crate::png::{self, ColorType};

/// A rendered tile. The variant depends on how it was drawn.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedImage {
    /// Unstyled single band
    Gray(GrayImage),
    /// Three-band passthrough
    Rgb(RgbImage),
    /// Styled single band
    Rgba(RgbaImage),
}

impl RenderedImage {
    pub fn width(&self) -> u32 {
        match self {
            RenderedImage::Gray(img) => img.width(),
            RenderedImage::Rgb(img) => img.width(),
            RenderedImage::Rgba(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            RenderedImage::Gray(img) => img.height(),
            RenderedImage::Rgb(img) => img.height(),
            RenderedImage::Rgba(img) => img.height(),
        }
    }

    /// Interleaved pixel bytes.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            RenderedImage::Gray(img) => img.as_raw(),
            RenderedImage::Rgb(img) => img.as_raw(),
            RenderedImage::Rgba(img) => img.as_raw(),
        }
    }

    pub fn color_type(&self) -> ColorType {
        match self {
            RenderedImage::Gray(_) => ColorType::Gray,
            RenderedImage::Rgb(_) => ColorType::Rgb,
            RenderedImage::Rgba(_) => ColorType::Rgba,
        }
    }

    /// Encode as PNG. Styled tiles become indexed PNGs when the palette fits.
    pub fn to_png(&self) -> RasterResult<Vec<u8>> {
        let (w, h) = (self.width() as usize, self.height() as usize);
        let encoded = match self {
            RenderedImage::Gray(img) => png::encode_gray(img.as_raw(), w, h)?,
            RenderedImage::Rgb(img) => png::encode_rgb(img.as_raw(), w, h)?,
            RenderedImage::Rgba(img) => png::encode_rgba_auto(img.as_raw(), w, h)?,
        };
        tracing::debug!(
            width = w,
            height = h,
            color = ?self.color_type(),
            bytes = encoded.len(),
            "Encoded tile PNG"
        );
        Ok(encoded)
    }
}

impl From<GrayImage> for RenderedImage {
    fn from(img: GrayImage) -> Self {
        RenderedImage::Gray(img)
    }
}

impl From<RgbImage> for RenderedImage {
    fn from(img: RgbImage) -> Self {
        RenderedImage::Rgb(img)
    }
}

impl From<RgbaImage> for RenderedImage {
    fn from(img: RgbaImage) -> Self {
        RenderedImage::Rgba(img)
    }
}
