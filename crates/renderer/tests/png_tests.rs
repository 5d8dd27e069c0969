//! Tests for PNG encoding functionality.
//!
//! Every encoder output is decoded again with the `image` crate to check the
//! file is valid and carries the pixels that went in.

use image::{DynamicImage, GenericImageView};
use raster_common::ValueRange;
use raster_style::{ColorMap, Rgba};
use renderer::png::{encode_gray, encode_indexed, encode_rgb, encode_rgba, encode_rgba_auto};
use renderer::{draw_color_map, draw_grayscale, draw_rgb, RenderedImage};
use test_utils::{create_byte_ramp, create_elevation_band, create_rgb_bands};

// ============================================================================
// Helper functions
// ============================================================================

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

fn decode(png: &[u8]) -> DynamicImage {
    image::load_from_memory_with_format(png, image::ImageFormat::Png).unwrap()
}

/// Elevation-like color map with a handful of discrete stops
fn elevation_map() -> ColorMap {
    ColorMap::from_stops(vec![
        (0.0, Rgba::new(0, 0, 0, 0)),
        (500.0, Rgba::opaque(47, 158, 68)),
        (1500.0, Rgba::opaque(245, 208, 59)),
        (3000.0, Rgba::opaque(184, 80, 15)),
        (4000.0, Rgba::opaque(255, 255, 255)),
    ])
}

// ============================================================================
// Basic encoding
// ============================================================================

#[test]
fn test_gray_roundtrip() {
    let pixels: Vec<u8> = (0..=255).collect();
    let png = encode_gray(&pixels, 16, 16).unwrap();
    assert_eq!(&png[0..8], &SIGNATURE);

    let img = decode(&png);
    assert_eq!(img.dimensions(), (16, 16));
    assert_eq!(img.to_luma8().as_raw(), &pixels);
}

#[test]
fn test_rgb_roundtrip() {
    let pixels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 10, 20, 30];
    let img = decode(&encode_rgb(&pixels, 2, 2).unwrap());
    assert_eq!(img.to_rgb8().as_raw(), &pixels.to_vec());
}

#[test]
fn test_rgba_roundtrip_with_transparency() {
    let pixels = [
        255, 0, 0, 255, // red, opaque
        0, 0, 0, 0, // transparent
        0, 255, 0, 128, // green, semi-transparent
        0, 0, 255, 255, // blue, opaque
    ];
    let img = decode(&encode_rgba(&pixels, 2, 2).unwrap());
    assert_eq!(img.to_rgba8().as_raw(), &pixels.to_vec());
}

#[test]
fn test_indexed_with_trns() {
    let palette = [[0, 0, 0, 0], [255, 255, 255, 255]];
    let indices = [0, 1, 1, 0];
    let png = encode_indexed(&indices, 2, 2, &palette).unwrap();
    assert!(png.windows(4).any(|w| w == b"tRNS"));

    let img = decode(&png).to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 0]);
    assert_eq!(img.get_pixel(1, 0).0, [255, 255, 255, 255]);
}

// ============================================================================
// Format selection
// ============================================================================

#[test]
fn test_auto_uses_indexed_for_few_colors() {
    let pixels: Vec<u8> = (0..64 * 64).flat_map(|i| if i % 2 == 0 { [255, 0, 0, 255] } else { [0, 0, 255, 255] }).collect();
    let png = encode_rgba_auto(&pixels, 64, 64).unwrap();
    assert!(png.windows(4).any(|w| w == b"PLTE"));
    assert_eq!(decode(&png).to_rgba8().as_raw(), &pixels);
}

#[test]
fn test_auto_falls_back_to_rgba_for_many_colors() {
    let pixels: Vec<u8> = (0..300u32).flat_map(|i| [(i % 256) as u8, (i / 2 % 256) as u8, (i / 3 % 256) as u8, 255]).collect();
    let png = encode_rgba_auto(&pixels, 300, 1).unwrap();
    assert!(!png.windows(4).any(|w| w == b"PLTE"));
    assert_eq!(decode(&png).to_rgba8().as_raw(), &pixels);
}

#[test]
fn test_large_styled_tile_parallel_palette() {
    // 256x256 is above the parallel palette threshold
    let samples = create_elevation_band(256, 256);
    let img = draw_color_map(&samples, 256, 256, &elevation_map()).unwrap();
    let png = RenderedImage::from(img.clone()).to_png().unwrap();
    assert_eq!(decode(&png).to_rgba8(), img);
}

// ============================================================================
// Rendered images
// ============================================================================

#[test]
fn test_rendered_gray_tile() {
    let img = draw_grayscale(&create_byte_ramp(256, 256), 256, 256, ValueRange::BYTE).unwrap();
    let rendered = RenderedImage::from(img);
    assert_eq!((rendered.width(), rendered.height()), (256, 256));
    assert_eq!(rendered.color_type(), renderer::ColorType::Gray);

    let decoded = decode(&rendered.to_png().unwrap());
    assert_eq!(decoded.to_luma8().as_raw(), rendered.as_raw());
}

#[test]
fn test_rendered_rgb_tile() {
    let bands = create_rgb_bands(32, 16);
    let img = draw_rgb([&bands[0], &bands[1], &bands[2]], 32, 16).unwrap();
    let rendered = RenderedImage::from(img);
    assert_eq!(rendered.as_raw().len(), 32 * 16 * 3);
    assert_eq!(decode(&rendered.to_png().unwrap()).to_rgb8().as_raw(), rendered.as_raw());
}
