//! Geographic coordinate as returned by the geocoder.

use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in degrees.
///
/// Values are passed through from the geocoder unchanged, no range validation
/// is performed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar distance in degree units between two coordinates.
    ///
    /// Latitude and longitude are treated as a flat Cartesian plane, so this
    /// is not a geodesic distance.
    pub fn degree_distance(&self, other: &Coordinate) -> f64 {
        let lat_diff = (self.lat - other.lat).abs();
        let lon_diff = (self.lon - other.lon).abs();
        (lat_diff * lat_diff + lon_diff * lon_diff).sqrt()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(value: Coordinate) -> Self {
        (value.lat, value.lon)
    }
}

/// `geo` uses x = longitude, y = latitude.
impl From<Coordinate> for geo::Coord<f64> {
    fn from(value: Coordinate) -> Self {
        geo::Coord {
            x: value.lon,
            y: value.lat,
        }
    }
}
