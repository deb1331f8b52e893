use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{Result, WeatherError};

/// A single geographic location in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Point {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,

    // Global grids are often published on 0..360 longitudes
    #[validate(range(min = -180.0, max = 360.0))]
    pub lon: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Ordered set of points stored as parallel latitude and longitude arrays.
///
/// Used both as the native grid of a message and as the target of a
/// spatial aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
}

impl PointSet {
    pub fn new(lats: Vec<f64>, lons: Vec<f64>) -> Result<Self> {
        if lats.len() != lons.len() {
            return Err(WeatherError::LengthMismatch {
                context: "point set longitudes".to_string(),
                expected: lats.len(),
                found: lons.len(),
            });
        }
        Ok(Self { lats, lons })
    }

    pub fn from_points(points: &[Point]) -> Self {
        Self {
            lats: points.iter().map(|p| p.lat).collect(),
            lons: points.iter().map(|p| p.lon).collect(),
        }
    }

    pub fn single(point: Point) -> Self {
        Self {
            lats: vec![point.lat],
            lons: vec![point.lon],
        }
    }

    pub fn len(&self) -> usize {
        self.lats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lats.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.lats
            .iter()
            .zip(self.lons.iter())
            .map(|(&lat, &lon)| Point::new(lat, lon))
    }

    /// Extent of the set as `(min_lat, max_lat, min_lon, max_lon)`, `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let fold = |values: &[f64]| {
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };
        let (min_lat, max_lat) = fold(self.lats.as_slice());
        let (min_lon, max_lon) = fold(self.lons.as_slice());
        Some((min_lat, max_lat, min_lon, max_lon))
    }

    /// Subset of the set at the given indices, in that order.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            lats: indices.iter().map(|&i| self.lats[i]).collect(),
            lons: indices.iter().map(|&i| self.lons[i]).collect(),
        }
    }
}

/// Rectangle given by two opposite corners in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn from_corners(a: Point, b: Point) -> Result<Self> {
        a.validate()?;
        b.validate()?;
        Ok(Self {
            min_lat: a.lat.min(b.lat),
            max_lat: a.lat.max(b.lat),
            min_lon: a.lon.min(b.lon),
            max_lon: a.lon.max(b.lon),
        })
    }

    pub fn midpoint(&self) -> Point {
        Point::new(
            0.5 * (self.min_lat + self.max_lat),
            0.5 * (self.min_lon + self.max_lon),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }

    /// True when every edge of the box lies within the given extent.
    pub fn is_within(&self, (min_lat, max_lat, min_lon, max_lon): (f64, f64, f64, f64)) -> bool {
        let lat_range = min_lat..=max_lat;
        let lon_range = min_lon..=max_lon;
        lat_range.contains(&self.min_lat)
            && lat_range.contains(&self.max_lat)
            && lon_range.contains(&self.min_lon)
            && lon_range.contains(&self.max_lon)
    }
}
