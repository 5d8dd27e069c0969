//! PNG encoding for rendered tiles.
//!
//! Supports four color types:
//! - **Grayscale (0)**: single-band tiles rendered without a style
//! - **RGB (2)**: three-band passthrough tiles
//! - **Indexed (3)**: styled tiles with ≤256 unique colors
//! - **RGBA (6)**: styled tiles with more colors
//!
//! Use [`encode_rgba_auto`] for styled output, which picks indexed when the
//! palette fits.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use raster_common::RasterError;
use thiserror::Error;

/// PNG file signature
const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

#[derive(Debug, Error)]
pub enum PngError {
    #[error("buffer has {actual} bytes, expected {expected} for {width}x{height} {color:?}")]
    BufferSize {
        expected: usize,
        actual: usize,
        width: usize,
        height: usize,
        color: ColorType,
    },

    #[error("IDAT compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

impl From<PngError> for RasterError {
    fn from(err: PngError) -> Self {
        RasterError::Encode(err.to_string())
    }
}

/// PNG color types written by this encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Gray,
    Rgb,
    Indexed,
    Rgba,
}

impl ColorType {
    /// IHDR color type byte.
    fn code(self) -> u8 {
        match self {
            ColorType::Gray => 0,
            ColorType::Rgb => 2,
            ColorType::Indexed => 3,
            ColorType::Rgba => 6,
        }
    }

    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColorType::Gray | ColorType::Indexed => 1,
            ColorType::Rgb => 3,
            ColorType::Rgba => 4,
        }
    }
}

/// Encode 8-bit grayscale pixels.
pub fn encode_gray(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    encode(pixels, width, height, ColorType::Gray, None)
}

/// Encode 8-bit RGB pixels.
pub fn encode_rgb(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    encode(pixels, width, height, ColorType::Rgb, None)
}

/// Encode 8-bit RGBA pixels (color type 6).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    encode(pixels, width, height, ColorType::Rgba, None)
}

/// Encode RGBA pixels, using an indexed PNG when there are at most 256 colors.
pub fn encode_rgba_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    check_len(pixels, width, height, ColorType::Rgba)?;

    let palette_result = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => encode_indexed(&indices, width, height, &palette),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode palette indices with their palette (color type 3).
///
/// A tRNS chunk is written only when some palette entry is not opaque.
pub fn encode_indexed(
    indices: &[u8],
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
) -> Result<Vec<u8>, PngError> {
    encode(indices, width, height, ColorType::Indexed, Some(palette))
}

fn check_len(pixels: &[u8], width: usize, height: usize, color: ColorType) -> Result<(), PngError> {
    let expected = width * height * color.bytes_per_pixel();
    if pixels.len() != expected {
        return Err(PngError::BufferSize {
            expected,
            actual: pixels.len(),
            width,
            height,
            color,
        });
    }
    Ok(())
}

fn encode(
    pixels: &[u8],
    width: usize,
    height: usize,
    color: ColorType,
    palette: Option<&[[u8; 4]]>,
) -> Result<Vec<u8>, PngError> {
    check_len(pixels, width, height, color)?;

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color.code());
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    if let Some(palette) = palette {
        let plte_data: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
        write_chunk(&mut png, b"PLTE", &plte_data);

        if palette.iter().any(|c| c[3] < 255) {
            let trns_data: Vec<u8> = palette.iter().map(|c| c[3]).collect();
            write_chunk(&mut png, b"tRNS", &trns_data);
        }
    }

    let idat_data = deflate_scanlines(pixels, width * color.bytes_per_pixel(), height)?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Prefix every scanline with filter byte 0 (none) and zlib-compress.
fn deflate_scanlines(pixels: &[u8], row_bytes: usize, height: usize) -> Result<Vec<u8>, std::io::Error> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in pixels.chunks_exact(row_bytes.max(1)).take(height) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

/// Write a PNG chunk: length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(c: &[u8]) -> u32 {
    u32::from_le_bytes([c[0], c[1], c[2], c[3]])
}

type Palette = (Vec<[u8; 4]>, Vec<u8>);

/// Sequential palette extraction for small images.
fn extract_palette_sequential(pixels: &[u8]) -> Option<Palette> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 4);

    for chunk in pixels.chunks_exact(4) {
        let packed = pack_color(chunk);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(packed.to_le_bytes());
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger images.
///
/// Collects unique colors per chunk, merges them into one palette, then maps
/// pixels to palette indices in a second parallel pass.
fn extract_palette_parallel(pixels: &[u8]) -> Option<Palette> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_size = chunk_pixels * 4;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_size)
        .flat_map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for pixel in chunk.chunks_exact(4) {
                local.insert(pack_color(pixel), ());
                // Early exit if we definitely have too many colors
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut global: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in unique_colors {
        if global.contains_key(&packed) {
            continue;
        }
        if palette.len() >= MAX_PALETTE_SIZE {
            return None;
        }
        global.insert(packed, palette.len() as u8);
        palette.push(packed.to_le_bytes());
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(chunk_pixels)
        .zip(pixels.par_chunks(chunk_size))
        .for_each(|(idx_chunk, pixel_chunk)| {
            for (idx, pixel) in idx_chunk.iter_mut().zip(pixel_chunk.chunks_exact(4)) {
                *idx = global.get(&pack_color(pixel)).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}
