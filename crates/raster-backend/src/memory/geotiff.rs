//! Native GeoTIFF decoding.
//!
//! Reads the first image of a TIFF with the `tiff` crate and recovers the
//! georeferencing from the GeoTIFF tags:
//!
//! - ModelPixelScaleTag (33550) + ModelTiepointTag (33922), or
//! - ModelTransformationTag (34264)
//! - GeoKeyDirectoryTag (34735) for the EPSG code

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use raster_common::{BackendOp, CrsCode, GeoTransform, RasterError, RasterResult};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::{debug, warn};

use super::dataset::MemDataset;

const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// Default CRS when a file carries no GeoKey directory.
const DEFAULT_EPSG: CrsCode = CrsCode::Epsg4326;

fn open_err(path: &str, msg: impl std::fmt::Display) -> RasterError {
    RasterError::backend(BackendOp::Open, format!("{}: {}", path, msg))
}

/// Decode a GeoTIFF file from disk.
pub fn read_geotiff(path: &Path) -> RasterResult<MemDataset> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|e| open_err(&name, e))?;
    decode_geotiff(BufReader::new(file), &name)
}

/// Decode a GeoTIFF from any `Read + Seek` source.
pub fn decode_geotiff<R: Read + Seek>(reader: R, name: &str) -> RasterResult<MemDataset> {
    let mut decoder = Decoder::new(reader).map_err(|e| open_err(name, format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| open_err(name, format!("cannot read dimensions: {}", e)))?;
    let (width, height) = (width as usize, height as usize);

    let samples_per_pixel = decoder.get_tag_u32(Tag::SamplesPerPixel).unwrap_or(1) as usize;
    if decoder.get_tag_u32(Tag::PlanarConfiguration).unwrap_or(1) == 2 {
        return Err(open_err(name, "planar sample layout is not supported"));
    }

    let interleaved = match decoder
        .read_image()
        .map_err(|e| open_err(name, format!("cannot read image data: {}", e)))?
    {
        DecodingResult::U8(buf) => to_f64(&buf),
        DecodingResult::U16(buf) => to_f64(&buf),
        DecodingResult::U32(buf) => to_f64(&buf),
        DecodingResult::I8(buf) => to_f64(&buf),
        DecodingResult::I16(buf) => to_f64(&buf),
        DecodingResult::I32(buf) => to_f64(&buf),
        DecodingResult::F32(buf) => to_f64(&buf),
        DecodingResult::F64(buf) => buf,
        _ => return Err(open_err(name, "unsupported TIFF sample format")),
    };

    if samples_per_pixel == 0 || interleaved.len() != width * height * samples_per_pixel {
        return Err(open_err(
            name,
            format!(
                "expected {}x{}x{} samples, got {}",
                width,
                height,
                samples_per_pixel,
                interleaved.len()
            ),
        ));
    }

    let bands = split_bands(&interleaved, samples_per_pixel);
    let geotransform = match read_geotransform(&mut decoder) {
        Some(gt) => gt,
        None => {
            warn!(path = %name, "No ModelPixelScale/ModelTiepoint or ModelTransformation tags, using pixel grid");
            GeoTransform::default()
        }
    };
    let crs = match read_crs(&mut decoder) {
        Some(crs) => crs,
        None => {
            warn!(path = %name, default = %DEFAULT_EPSG, "No usable GeoKey directory, assuming default CRS");
            DEFAULT_EPSG
        }
    };

    debug!(
        path = %name,
        width = width,
        height = height,
        bands = bands.len(),
        crs = %crs,
        "Decoded GeoTIFF"
    );

    MemDataset::new(width, height, bands, geotransform, crs)
}

fn to_f64<T: Copy + Into<f64>>(buf: &[T]) -> Vec<f64> {
    buf.iter().map(|&v| v.into()).collect()
}

/// Split chunky pixels (`b1 b2 b3 b1 b2 b3 ...`) into one vector per band.
fn split_bands(interleaved: &[f64], samples: usize) -> Vec<Vec<f64>> {
    let pixels = interleaved.len() / samples;
    let mut bands: Vec<Vec<f64>> = (0..samples).map(|_| Vec::with_capacity(pixels)).collect();
    for pixel in interleaved.chunks_exact(samples) {
        for (band, &value) in bands.iter_mut().zip(pixel) {
            band.push(value);
        }
    }
    bands
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok();
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok();

    if let (Some(scale), Some(tiepoint)) = (scale, tiepoint) {
        if scale.len() >= 2 && tiepoint.len() >= 6 {
            // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
            let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
            let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
            return Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]));
        }
    }

    let m = decoder.get_tag_f64_vec(Tag::ModelTransformationTag).ok()?;
    if m.len() < 16 {
        return None;
    }
    Some(GeoTransform::from_coefficients([m[3], m[0], m[1], m[7], m[4], m[5]]))
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CrsCode> {
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    epsg_from_geokeys(&keys).and_then(|code| CrsCode::from_epsg(code).ok())
}

/// Find the EPSG code in a GeoKey directory.
///
/// Layout: a 4-value header `[version, revision, minor, count]` followed by
/// `count` entries of `[key, location, count, value]`. Only inline values
/// (location 0) are considered. A projected CRS wins over a geographic one.
fn epsg_from_geokeys(keys: &[u16]) -> Option<u16> {
    let header = keys.get(0..4)?;
    let count = header[3] as usize;

    let mut geographic = None;
    let mut projected = None;
    for entry in keys[4..].chunks_exact(4).take(count) {
        let (key, location, value) = (entry[0], entry[1], entry[3]);
        // 32767 is "user-defined"
        if location != 0 || value == 0 || value == 32767 {
            continue;
        }
        match key {
            PROJECTED_CS_TYPE_KEY => projected = Some(value),
            GEOGRAPHIC_TYPE_KEY => geographic = Some(value),
            _ => {}
        }
    }
    projected.or(geographic)
}
