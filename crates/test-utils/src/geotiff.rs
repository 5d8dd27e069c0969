//! GeoTIFF fixture writer.
//!
//! Writes small georeferenced TIFFs with the `tiff` encoder so tests can go
//! through the real file decoding path.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::colortype::{Gray32Float, Gray8, RGB8};
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tiff::{TiffError, TiffResult};

/// North-up georeferencing for a fixture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoRef {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Positive; the raster runs top to bottom.
    pub pixel_height: f64,
    pub epsg: u16,
}

impl GeoRef {
    /// Georeferencing covering `(min_x, min_y, max_x, max_y)` with a `width` x `height` grid.
    pub fn from_bbox(bbox: (f64, f64, f64, f64), width: usize, height: usize, epsg: u16) -> Self {
        let (min_x, min_y, max_x, max_y) = bbox;
        Self {
            origin_x: min_x,
            origin_y: max_y,
            pixel_width: (max_x - min_x) / width as f64,
            pixel_height: (max_y - min_y) / height as f64,
            epsg,
        }
    }
}

/// Sample encoding used in the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleType {
    U8,
    F32,
}

/// Write `bands` (row-major, `width * height` each) as a GeoTIFF.
///
/// One band is written as gray (`U8` or `F32`), three bands as 8-bit RGB.
pub fn write_geotiff(
    path: &Path,
    width: usize,
    height: usize,
    bands: &[Vec<f64>],
    georef: GeoRef,
    sample_type: SampleType,
) -> TiffResult<()> {
    let file = BufWriter::new(File::create(path)?);
    let mut encoder = TiffEncoder::new(file)?;
    let (w, h) = (width as u32, height as u32);

    let scale = [georef.pixel_width, georef.pixel_height, 0.0];
    let tiepoint = [0.0, 0.0, 0.0, georef.origin_x, georef.origin_y, 0.0];
    let crs_key = if georef.epsg == 4326 { 2048 } else { 3072 };
    let model_type = if georef.epsg == 4326 { 2 } else { 1 };
    let geokeys: [u16; 16] = [
        1, 1, 0, 3, // Version 1.1.0, 3 keys
        1024, 0, 1, model_type, // GTModelTypeGeoKey
        1025, 0, 1, 1, // GTRasterTypeGeoKey = RasterPixelIsArea
        crs_key, 0, 1, georef.epsg,
    ];

    macro_rules! write_image {
        ($color:ty, $data:expr) => {{
            let mut image = encoder.new_image::<$color>(w, h)?;
            image.encoder().write_tag(Tag::ModelPixelScaleTag, &scale[..])?;
            image.encoder().write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
            image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &geokeys[..])?;
            image.write_data(&$data)?;
        }};
    }

    match (bands.len(), sample_type) {
        (1, SampleType::F32) => {
            let data: Vec<f32> = bands[0].iter().map(|&v| v as f32).collect();
            write_image!(Gray32Float, data);
        }
        (1, SampleType::U8) => {
            let data: Vec<u8> = bands[0].iter().map(|&v| v as u8).collect();
            write_image!(Gray8, data);
        }
        (3, _) => {
            let mut data = Vec::with_capacity(width * height * 3);
            for i in 0..width * height {
                for band in bands {
                    data.push(band[i] as u8);
                }
            }
            write_image!(RGB8, data);
        }
        (n, _) => {
            return Err(TiffError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("fixture writer supports 1 or 3 bands, got {}", n),
            )))
        }
    }

    Ok(())
}
