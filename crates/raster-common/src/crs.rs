//! Coordinate Reference System codes and point transformations.
//!
//! WGS84 and Web Mercator are handled with closed-form math. Any other EPSG
//! code is resolved through the `crs-definitions` database and transformed
//! with `proj4rs`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bbox::BoundingBox;
use crate::error::RasterError;

/// Spherical mercator earth radius in meters.
const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude limit of the Web Mercator square.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// Half the width of the Web Mercator square in meters.
pub const WEB_MERCATOR_EXTENT: f64 = 20037508.342789244;

/// A coordinate reference system identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrsCode {
    /// WGS84 Geographic (lon/lat in degrees)
    Epsg4326,
    /// Web Mercator (meters)
    Epsg3857,
    /// Any other EPSG code known to the definitions database
    Epsg(u16),
}

impl CrsCode {
    /// Parse a CRS string such as "EPSG:4326", "epsg:3857", "CRS:84" or "EPSG:32633".
    pub fn parse(s: &str) -> Result<Self, RasterError> {
        let normalized = s.trim().to_uppercase();

        match normalized.as_str() {
            "EPSG:4326" | "CRS:84" | "WGS84" => return Ok(CrsCode::Epsg4326),
            "EPSG:3857" | "EPSG:900913" => return Ok(CrsCode::Epsg3857),
            _ => {}
        }

        let code = normalized
            .strip_prefix("EPSG:")
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| RasterError::InvalidCrs(s.to_string()))?;

        match code {
            4326 => Ok(CrsCode::Epsg4326),
            3857 => Ok(CrsCode::Epsg3857),
            _ if crs_definitions::from_code(code).is_some() => Ok(CrsCode::Epsg(code)),
            _ => Err(RasterError::InvalidCrs(s.to_string())),
        }
    }

    pub fn epsg(&self) -> u16 {
        match self {
            CrsCode::Epsg4326 => 4326,
            CrsCode::Epsg3857 => 3857,
            CrsCode::Epsg(code) => *code,
        }
    }

    /// Build from a numeric EPSG code.
    pub fn from_epsg(code: u16) -> Result<Self, RasterError> {
        Self::parse(&format!("EPSG:{}", code))
    }

    /// Check if this is a geographic (lon/lat) CRS.
    pub fn is_geographic(&self) -> bool {
        match self {
            CrsCode::Epsg4326 => true,
            CrsCode::Epsg3857 => false,
            CrsCode::Epsg(code) => proj_string(*code)
                .map(|p| p.contains("+proj=longlat"))
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for CrsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl std::str::FromStr for CrsCode {
    type Err = RasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn proj_string(code: u16) -> Option<&'static str> {
    crs_definitions::from_code(code).map(|def| def.proj4)
}

/// Convert longitude/latitude in degrees to Web Mercator meters.
pub fn lon_lat_to_mercator(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Convert Web Mercator meters to longitude/latitude in degrees.
pub fn mercator_to_lon_lat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - std::f64::consts::FRAC_PI_2).to_degrees();
    (lon, lat)
}

/// Transformations that need no projection database.
///
/// Unlike [`CrsTransformer`] this is `Copy + Sync` and can be shared across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedForm {
    Identity,
    ToMercator,
    FromMercator,
}

impl ClosedForm {
    pub fn apply(self, x: f64, y: f64) -> (f64, f64) {
        match self {
            ClosedForm::Identity => (x, y),
            ClosedForm::ToMercator => lon_lat_to_mercator(x, y),
            ClosedForm::FromMercator => mercator_to_lon_lat(x, y),
        }
    }
}

/// A prepared transformation between two coordinate systems.
pub enum CrsTransformer {
    Identity,
    ToMercator,
    FromMercator,
    Proj {
        source: proj4rs::proj::Proj,
        target: proj4rs::proj::Proj,
        source_geographic: bool,
        target_geographic: bool,
    },
}

impl CrsTransformer {
    pub fn new(from: CrsCode, to: CrsCode) -> Result<Self, RasterError> {
        if from == to {
            return Ok(CrsTransformer::Identity);
        }
        match (from, to) {
            (CrsCode::Epsg4326, CrsCode::Epsg3857) => Ok(CrsTransformer::ToMercator),
            (CrsCode::Epsg3857, CrsCode::Epsg4326) => Ok(CrsTransformer::FromMercator),
            _ => {
                let build = |code: CrsCode| -> Result<proj4rs::proj::Proj, RasterError> {
                    let def = proj_string(code.epsg())
                        .ok_or_else(|| RasterError::InvalidCrs(code.to_string()))?;
                    proj4rs::proj::Proj::from_proj_string(def)
                        .map_err(|e| RasterError::InvalidCrs(format!("{}: {:?}", code, e)))
                };
                Ok(CrsTransformer::Proj {
                    source: build(from)?,
                    target: build(to)?,
                    source_geographic: from.is_geographic(),
                    target_geographic: to.is_geographic(),
                })
            }
        }
    }

    /// The thread-shareable form of this transform, if it has one.
    pub fn closed_form(&self) -> Option<ClosedForm> {
        match self {
            CrsTransformer::Identity => Some(ClosedForm::Identity),
            CrsTransformer::ToMercator => Some(ClosedForm::ToMercator),
            CrsTransformer::FromMercator => Some(ClosedForm::FromMercator),
            CrsTransformer::Proj { .. } => None,
        }
    }

    /// Transform one point. Returns `None` when the point has no image in the target CRS.
    pub fn transform(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let (tx, ty) = match self {
            CrsTransformer::Identity => (x, y),
            CrsTransformer::ToMercator => ClosedForm::ToMercator.apply(x, y),
            CrsTransformer::FromMercator => ClosedForm::FromMercator.apply(x, y),
            CrsTransformer::Proj {
                source,
                target,
                source_geographic,
                target_geographic,
            } => {
                // proj4rs uses radians for geographic coordinates
                let mut point = if *source_geographic {
                    (x.to_radians(), y.to_radians(), 0.0)
                } else {
                    (x, y, 0.0)
                };
                proj4rs::transform::transform(source, target, &mut point).ok()?;
                if *target_geographic {
                    (point.0.to_degrees(), point.1.to_degrees())
                } else {
                    (point.0, point.1)
                }
            }
        };
        (tx.is_finite() && ty.is_finite()).then_some((tx, ty))
    }

    /// Transform a bounding box by sampling points along its edges.
    pub fn transform_bbox(&self, bbox: &BoundingBox) -> Option<BoundingBox> {
        if matches!(self, CrsTransformer::Identity) {
            return Some(*bbox);
        }

        const STEPS: usize = 8;
        let mut points = Vec::with_capacity(4 * (STEPS + 1));
        for i in 0..=STEPS {
            let t = i as f64 / STEPS as f64;
            let x = bbox.min_x + t * bbox.width();
            let y = bbox.min_y + t * bbox.height();
            points.push((x, bbox.min_y));
            points.push((x, bbox.max_y));
            points.push((bbox.min_x, y));
            points.push((bbox.max_x, y));
        }

        let projected: Vec<(f64, f64)> = points
            .into_iter()
            .filter_map(|(x, y)| self.transform(x, y))
            .collect();
        BoundingBox::from_points(&projected)
    }
}

/// Transform a single point between two coordinate systems.
pub fn transform_point(from: CrsCode, to: CrsCode, x: f64, y: f64) -> Result<(f64, f64), RasterError> {
    CrsTransformer::new(from, to)?
        .transform(x, y)
        .ok_or_else(|| RasterError::InvalidCrs(format!("cannot transform ({}, {}) from {} to {}", x, y, from, to)))
}
