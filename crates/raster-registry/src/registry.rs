//! Concurrent cache of loaded raster sources.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use raster_backend::{DatasetHandle, RasterBackend};
use raster_common::{RasterError, RasterResult, ValueRange};
use tracing::{debug, info, instrument, warn};

use crate::config::RegistryConfig;
use crate::options::LoadOptions;
use crate::source::{basename, RasterSource};

/// Loaded sources keyed by file basename.
///
/// Lookups take a shared lock, while loading and releasing take it
/// exclusively. Backend I/O always happens outside the lock.
///
/// Every critical section is a single map call, so a lock poisoned by a
/// panicking thread still guards a consistent map and is recovered.
pub struct DatasetRegistry {
    backend: Arc<dyn RasterBackend>,
    config: Arc<RegistryConfig>,
    sources: RwLock<HashMap<String, Arc<RasterSource>>>,
}

impl DatasetRegistry {
    /// Create a registry on `backend`. Registers the backend's drivers.
    pub fn new(backend: Arc<dyn RasterBackend>, config: RegistryConfig) -> RasterResult<Self> {
        config.validate().map_err(RasterError::Config)?;
        backend.register_drivers();
        info!(
            backend = backend.name(),
            strategy = %config.render_strategy,
            zoom_extent_crs = %config.zoom_extent_crs,
            "Dataset registry ready"
        );

        Ok(Self {
            backend,
            config: Arc::new(config),
            sources: RwLock::new(HashMap::new()),
        })
    }

    fn read_sources(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<RasterSource>>> {
        self.sources.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_sources(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<RasterSource>>> {
        self.sources.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn backend(&self) -> &Arc<dyn RasterBackend> {
        &self.backend
    }

    /// Open `path`, scan band 1 for its value range and cache the source
    /// under the path's basename, replacing any source cached there.
    ///
    /// On failure the cache is left as it was.
    #[instrument(skip(self, options), fields(styled = options.style.is_some(), source_crs = ?options.source_crs))]
    pub fn load(&self, path: &str, options: LoadOptions) -> RasterResult<Arc<RasterSource>> {
        let start = Instant::now();

        let handle = DatasetHandle::open(&self.backend, path)?;
        let value_range = scan_value_range(&handle)?;
        let extent = handle.bounds()?;

        if let Some(style) = &options.style {
            for warning in style.validate() {
                warn!(path = %path, warning = %warning, "Style warning");
            }
        }

        let source = Arc::new(RasterSource::new(
            path,
            handle,
            value_range,
            options.style,
            extent,
            Arc::clone(&self.config),
        )
        .with_source_crs(options.source_crs));
        let name = source.name();

        let (replaced, cached) = {
            let mut sources = self.write_sources();
            let replaced = sources.insert(name.clone(), Arc::clone(&source));
            (replaced, sources.len())
        };
        if replaced.is_some() {
            debug!(name = %name, "Replaced cached source");
        }
        // the replaced source closes once its last reader drops it
        drop(replaced);

        crate::metrics::record_load(start.elapsed(), cached);
        info!(
            name = %name,
            min = value_range.min,
            max = value_range.max,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded raster"
        );
        Ok(source)
    }

    /// Look up a loaded source by basename.
    pub fn read(&self, name: &str) -> RasterResult<Arc<RasterSource>> {
        let found = self.read_sources().get(name).cloned();
        crate::metrics::record_read(found.is_some());
        found.ok_or_else(|| RasterError::NotLoaded(name.to_string()))
    }

    /// Drop the source cached under the basename of `path`. Unknown names are ignored.
    ///
    /// The dataset is closed now when nobody else holds the source, otherwise
    /// when the last holder drops it.
    #[instrument(skip(self))]
    pub fn release(&self, path: &str) -> RasterResult<()> {
        let name = basename(path);
        let (removed, cached) = {
            let mut sources = self.write_sources();
            let removed = sources.remove(&name);
            (removed, sources.len())
        };

        let Some(source) = removed else {
            debug!(name = %name, "Release of unknown source ignored");
            return Ok(());
        };
        crate::metrics::record_release(cached);

        match Arc::try_unwrap(source) {
            Ok(source) => source.release(),
            Err(_) => {
                debug!(name = %name, "Source still in use, closing when the last reader drops it");
                Ok(())
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_sources().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.read_sources().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names of every cached source, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_sources().keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for DatasetRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetRegistry")
            .field("backend", &self.backend.name())
            .field("config", &self.config)
            .field("sources", &self.names())
            .finish()
    }
}

/// Range of band 1. Sources without bands or without a single valid sample get `{0, 0}`.
fn scan_value_range(handle: &DatasetHandle) -> RasterResult<ValueRange> {
    if handle.band_count()? == 0 {
        return Ok(ValueRange::default());
    }
    let samples = handle.read_band(1)?;
    Ok(ValueRange::scan(&samples).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raster_backend::{MemDataset, MemoryBackend};
    use raster_common::{BoundingBox, CrsCode, GeoTransform};
    use test_utils::{create_byte_ramp, create_constant_band, with_nans};

    fn registry_with(datasets: Vec<(&str, Vec<Vec<f64>>)>) -> (Arc<MemoryBackend>, DatasetRegistry) {
        let backend = Arc::new(MemoryBackend::new());
        let bbox = BoundingBox::new(0.0, 0.0, 16.0, 16.0);
        for (path, bands) in datasets {
            let dataset = MemDataset::new(16, 16, bands, GeoTransform::from_bbox(&bbox, 16, 16), CrsCode::Epsg3857).unwrap();
            backend.insert_dataset(path, dataset).unwrap();
        }
        let registry = DatasetRegistry::new(backend.clone(), RegistryConfig::default()).unwrap();
        (backend, registry)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = RegistryConfig {
            max_render_size: 0,
            ..Default::default()
        };
        let err = DatasetRegistry::new(Arc::new(MemoryBackend::new()), config).unwrap_err();
        assert_eq!(err.kind(), "config");
    }

    #[test]
    fn test_load_scans_band_one() {
        let (_backend, registry) = registry_with(vec![("/mem/ramp.tif", vec![create_byte_ramp(16, 16)])]);
        let source = registry.load("/mem/ramp.tif", LoadOptions::new()).unwrap();
        assert_eq!(source.value_range(), ValueRange::BYTE);
        assert_eq!(source.name(), "ramp.tif");
        assert_eq!(source.extent(), BoundingBox::new(0.0, 0.0, 16.0, 16.0));
    }

    #[test]
    fn test_load_value_range_edge_cases() {
        let (_backend, registry) = registry_with(vec![
            ("/mem/nan.tif", vec![with_nans(create_constant_band(16, 16, 7.0), 3)]),
            ("/mem/allnan.tif", vec![create_constant_band(16, 16, f64::NAN)]),
            ("/mem/empty.tif", vec![]),
            (
                "/mem/two.tif",
                vec![create_constant_band(16, 16, 1.0), create_constant_band(16, 16, 99.0)],
            ),
        ]);

        let range = |path: &str| registry.load(path, LoadOptions::new()).unwrap().value_range();
        assert_eq!(range("/mem/nan.tif"), ValueRange::new(7.0, 7.0));
        assert_eq!(range("/mem/allnan.tif"), ValueRange::new(0.0, 0.0));
        assert_eq!(range("/mem/empty.tif"), ValueRange::new(0.0, 0.0));
        assert_eq!(range("/mem/two.tif"), ValueRange::new(1.0, 1.0));
    }

    #[test]
    fn test_load_applies_source_crs() {
        let (_backend, registry) = registry_with(vec![
            ("/mem/declared.tif", vec![create_byte_ramp(16, 16)]),
            ("/mem/assumed.tif", vec![create_byte_ramp(16, 16)]),
        ]);
        let declared = registry.load("/mem/declared.tif", LoadOptions::new()).unwrap();
        let assumed = registry
            .load("/mem/assumed.tif", LoadOptions::new().with_source_crs(CrsCode::Epsg4326))
            .unwrap();
        assert_eq!(declared.crs().unwrap(), CrsCode::Epsg3857);
        assert_eq!(assumed.crs().unwrap(), CrsCode::Epsg4326);
    }

    #[test]
    fn test_read_missing_is_not_loaded() {
        let (_backend, registry) = registry_with(vec![]);
        let err = registry.read("nothing.tif").unwrap_err();
        assert!(matches!(err, RasterError::NotLoaded(name) if name == "nothing.tif"));
    }

    #[test]
    fn test_failed_load_leaves_cache_untouched() {
        let (backend, registry) = registry_with(vec![("/mem/a.tif", vec![create_byte_ramp(16, 16)])]);
        registry.load("/mem/a.tif", LoadOptions::new()).unwrap();

        assert!(registry.load("/mem/missing.tif", LoadOptions::new()).is_err());
        assert!(registry.load("/mem/a.png", LoadOptions::new()).is_err());
        assert_eq!(registry.names(), vec!["a.tif".to_string()]);
        assert_eq!(backend.open_handles(), 1);
    }

    #[test]
    fn test_release_closes_unshared_source() {
        let (backend, registry) = registry_with(vec![("/mem/a.tif", vec![create_byte_ramp(16, 16)])]);
        drop(registry.load("/mem/a.tif", LoadOptions::new()).unwrap());
        assert_eq!(backend.open_handles(), 1);

        registry.release("/mem/a.tif").unwrap();
        assert!(registry.is_empty());
        assert_eq!(backend.open_handles(), 0);

        // second release is a no-op
        registry.release("/mem/a.tif").unwrap();
    }

    #[test]
    fn test_release_defers_close_while_held() {
        let (backend, registry) = registry_with(vec![("/mem/a.tif", vec![create_byte_ramp(16, 16)])]);
        let held = registry.load("/mem/a.tif", LoadOptions::new()).unwrap();

        registry.release("a.tif").unwrap();
        assert!(!registry.contains("a.tif"));
        assert_eq!(backend.open_handles(), 1);
        assert_eq!(held.size().unwrap(), (16, 16));

        drop(held);
        assert_eq!(backend.open_handles(), 0);
    }

    #[test]
    fn test_registry_recovers_from_poisoned_lock() {
        let (backend, registry) = registry_with(vec![
            ("/mem/a.tif", vec![create_byte_ramp(16, 16)]),
            ("/mem/b.tif", vec![create_byte_ramp(16, 16)]),
        ]);
        registry.load("/mem/a.tif", LoadOptions::new()).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = registry.sources.write().unwrap();
            panic!("poison registry lock");
        }));
        assert!(result.is_err());
        assert!(registry.sources.is_poisoned());

        assert!(registry.contains("a.tif"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), vec!["a.tif".to_string()]);
        assert!(registry.read("a.tif").is_ok());

        registry.load("/mem/b.tif", LoadOptions::new()).unwrap();
        assert_eq!(registry.len(), 2);
        registry.release("a.tif").unwrap();
        assert_eq!(registry.names(), vec!["b.tif".to_string()]);
        assert_eq!(backend.open_handles(), 1);
    }

    #[test]
    fn test_drop_closes_everything() {
        let (backend, registry) = registry_with(vec![
            ("/mem/a.tif", vec![create_byte_ramp(16, 16)]),
            ("/mem/b.tif", vec![create_byte_ramp(16, 16)]),
        ]);
        registry.load("/mem/a.tif", LoadOptions::new()).unwrap();
        registry.load("/mem/b.tif", LoadOptions::new()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(backend.open_handles(), 2);

        drop(registry);
        assert_eq!(backend.open_handles(), 0);
    }
}
