//! Metrics emitted by the registry and the render pipeline.
//!
//! Everything goes through the `metrics` facade; nothing is recorded until
//! the process installs a recorder.

use std::time::Duration;

use metrics::{counter, gauge, histogram};
use raster_common::RasterError;

use crate::config::RenderStrategy;

fn as_ms(elapsed: Duration) -> f64 {
    elapsed.as_micros() as f64 / 1000.0
}

/// Record a finished load.
pub fn record_load(elapsed: Duration, cached: usize) {
    counter!("raster_registry_loads_total").increment(1);
    histogram!("raster_registry_load_duration_ms").record(as_ms(elapsed));
    gauge!("raster_registry_cached_sources").set(cached as f64);
}

/// Record a lookup by name.
pub fn record_read(hit: bool) {
    if hit {
        counter!("raster_registry_read_hits_total").increment(1);
    } else {
        counter!("raster_registry_read_misses_total").increment(1);
    }
}

pub fn record_release(cached: usize) {
    counter!("raster_registry_releases_total").increment(1);
    gauge!("raster_registry_cached_sources").set(cached as f64);
}

/// Record a render attempt and its outcome.
pub fn record_render(strategy: RenderStrategy, elapsed: Duration, error: Option<&RasterError>) {
    let label = strategy.as_str();
    counter!("raster_renders_total", "strategy" => label).increment(1);
    histogram!("raster_render_duration_ms", "strategy" => label).record(as_ms(elapsed));
    if let Some(err) = error {
        counter!("raster_render_errors_total", "kind" => err.kind()).increment(1);
    }
}

pub fn record_zoom(elapsed: Duration) {
    counter!("raster_zooms_total").increment(1);
    histogram!("raster_zoom_duration_ms").record(as_ms(elapsed));
}
