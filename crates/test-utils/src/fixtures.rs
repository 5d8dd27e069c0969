//! Common test fixtures for raster-tiles tests.

/// Common bounding boxes as `(min_x, min_y, max_x, max_y)`.
pub mod bbox {
    /// Half the Web Mercator square, in meters.
    pub const MERCATOR_HALF: f64 = 20037508.342789244;

    /// Whole Web Mercator world.
    pub const WORLD_MERCATOR: (f64, f64, f64, f64) = (-MERCATOR_HALF, -MERCATOR_HALF, MERCATOR_HALF, MERCATOR_HALF);

    /// Zoom-1 north-west tile of the Web Mercator grid.
    pub const TILE_Z1_NW: (f64, f64, f64, f64) = (-MERCATOR_HALF, 0.0, 0.0, MERCATOR_HALF);

    /// Global geographic extent.
    pub const GLOBAL_LONLAT: (f64, f64, f64, f64) = (-180.0, -90.0, 180.0, 90.0);

    /// Small area around central Italy, in degrees.
    pub const ITALY_LONLAT: (f64, f64, f64, f64) = (11.0, 41.0, 13.0, 43.0);

    /// Does not overlap any fixture raster.
    pub const FAR_AWAY: (f64, f64, f64, f64) = (1.0e9, 1.0e9, 2.0e9, 2.0e9);
}

/// Common CRS identifiers.
pub mod crs {
    /// WGS84 geographic
    pub const EPSG_4326: &str = "EPSG:4326";

    /// Web Mercator
    pub const EPSG_3857: &str = "EPSG:3857";

    /// UTM zone 33N
    pub const EPSG_32633: &str = "EPSG:32633";
}

/// Style text fixtures.
pub mod styles {
    /// Three-stop style in the CSS-like text format.
    pub const THREE_STOP_CSS: &str = r#"raster {
    raster-channels: auto;
    color-map-entry(#ff0000, 0, 1.0, "low");
    color-map-entry(#00ff00, 100, 1.0, "mid");
    color-map-entry(#0000ff, 200, 1.0, "high");
}
"#;

    /// Same style as [`THREE_STOP_CSS`] in JSON.
    pub const THREE_STOP_JSON: &str = r##"{
  "raster_channels": "auto",
  "color_map": [
    {"color": "#ff0000", "quantity": 0, "opacity": 1.0, "label": "low"},
    {"color": "#00ff00", "quantity": 100, "opacity": 1.0, "label": "mid"},
    {"color": "#0000ff", "quantity": 200, "opacity": 1.0, "label": "high"}
  ]
}
"##;
}
