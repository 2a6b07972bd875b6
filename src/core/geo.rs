//! Great-circle distance on a spherical Earth.

use crate::utils::error::{OptimizerError, Result};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint", into = "RawPoint")]
pub struct Point {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl Point {
    /// Fails with [`OptimizerError::InvalidCoordinate`] when latitude is
    /// outside `[-90, 90]`, longitude outside `[-180, 180]`, or either is
    /// not finite.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
        if !(lat_ok && lon_ok) {
            return Err(OptimizerError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Arithmetic mean of the two latitudes and of the two longitudes.
    ///
    /// This is not the geodesic midpoint. Both inputs are in range, so the
    /// mean is too.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point {
            lat: (self.lat + other.lat) / 2.0,
            lon: (self.lon + other.lon) / 2.0,
        }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }
}

impl TryFrom<RawPoint> for Point {
    type Error = OptimizerError;

    fn try_from(raw: RawPoint) -> Result<Self> {
        Point::new(raw.lat, raw.lon)
    }
}

impl From<Point> for RawPoint {
    fn from(point: Point) -> Self {
        RawPoint {
            lat: point.lat,
            lon: point.lon,
        }
    }
}

/// Haversine distance between two points, in kilometres.
pub fn distance(p1: Point, p2: Point) -> f64 {
    haversine_km(p1.lat, p1.lon, p2.lat, p2.lon)
}

/// Validates both coordinate pairs before computing the distance.
pub fn try_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64> {
    Ok(distance(Point::new(lat1, lon1)?, Point::new(lat2, lon2)?))
}

/// Raw haversine on unvalidated degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // 取絕對值讓 distance(a, b) 與 distance(b, a) 位元上完全相同
    let d_lat = (lat2 - lat1).abs().to_radians();
    let d_lon = (lon2 - lon1).abs().to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    // 浮點誤差可能讓 a 略超出 [0, 1]
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
