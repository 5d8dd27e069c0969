//! Style file loading tests.

use std::io::Write;
use std::path::PathBuf;

use raster_style::{load_style_file, parse_hex_color, Rgba, StyleError};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata/styles")
        .join(name)
}

#[test]
fn test_sample_css() {
    let style = load_style_file(testdata("sample.css")).unwrap();
    assert_eq!(style.raster_channels, "auto");
    assert_eq!(style.color_map.len(), 11);
    assert!(style.validate().is_empty());
    assert_eq!(style.color_map[5].label, "hills, low");
}

#[test]
fn test_sample_css_evaluation() {
    let map = load_style_file(testdata("sample.css")).unwrap().color_map();
    assert_eq!(map.evaluate(-5.0), Rgba::opaque(0, 0, 0));
    assert_eq!(map.evaluate(10.0), parse_hex_color("#0a2f6b"));
    assert_eq!(map.evaluate(11.0), parse_hex_color("#1d6ea8"));
    assert_eq!(map.evaluate(8848.0), Rgba::opaque(255, 255, 255));
}

#[test]
fn test_sample_json() {
    let style = load_style_file(testdata("sample.json")).unwrap();
    assert_eq!(style.color_map.len(), 3);
    assert_eq!(style.color_map[1].quantity, 100.0);
}

#[test]
fn test_missing_file() {
    let err = load_style_file(testdata("does-not-exist.css")).unwrap_err();
    assert!(matches!(err, StyleError::Read { .. }));
}

#[test]
fn test_unknown_extension() {
    let err = load_style_file(testdata("sample.sld")).unwrap_err();
    assert!(matches!(err, StyleError::UnsupportedFormat(_)));
}

#[test]
fn test_malformed_entry_in_file() {
    let mut file = tempfile::Builder::new().suffix(".css").tempfile().unwrap();
    writeln!(file, "raster-channels: auto;").unwrap();
    writeln!(file, "color-map-entry(#fff, 1, 1, \"ok\")").unwrap();
    writeln!(file, "color-map-entry(#fff, 2, \"broken\")").unwrap();
    file.flush().unwrap();

    let err = load_style_file(file.path()).unwrap_err();
    assert!(err.to_string().starts_with("line 3"));

    let raster_err: raster_common::RasterError = err.into();
    assert_eq!(raster_err.kind(), "style_parse");
}

#[test]
fn test_bad_json() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, "{{ not json").unwrap();
    file.flush().unwrap();
    assert!(matches!(load_style_file(file.path()).unwrap_err(), StyleError::Json(_)));
}
