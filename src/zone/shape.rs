//! Delivery zone geometries and their containment tests.

use geo::{BoundingRect, Coord, LineString, Polygon};
use serde::Serialize;
use thiserror::Error;

use crate::models::Coordinate;

#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    #[error("Polygon zone needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),
    #[error("Circular zone radius must be a positive finite number, got {0}")]
    InvalidRadius(f64),
}

/// Closed ring of vertices, edges run from `vertices[i]` to `vertices[(i + 1) % n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonZone {
    vertices: Vec<Coordinate>,
}

impl PolygonZone {
    pub fn new(vertices: Vec<Coordinate>) -> Result<Self, ZoneError> {
        let mut distinct: Vec<&Coordinate> = Vec::with_capacity(vertices.len());
        for vertex in &vertices {
            if !distinct.contains(&vertex) {
                distinct.push(vertex);
            }
            if distinct.len() >= 3 {
                return Ok(Self { vertices });
            }
        }
        Err(ZoneError::TooFewVertices(distinct.len()))
    }

    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    /// Same ring traversed in the opposite direction
    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self { vertices }
    }

    /// Even-odd ray casting in (lat, lon) space treated as a flat plane.
    ///
    /// The ray runs from the point towards increasing longitude. Points exactly
    /// on an edge or vertex get whatever the crossing rule yields for them.
    pub fn contains(&self, point: &Coordinate) -> bool {
        let (lat, lon) = (point.lat, point.lon);
        let n = self.vertices.len();
        let mut inside = false;

        let mut j = n - 1;
        for i in 0..n {
            let (lat_i, lon_i) = (self.vertices[i].lat, self.vertices[i].lon);
            let (lat_j, lon_j) = (self.vertices[j].lat, self.vertices[j].lon);

            // Keep this exact operation order, boundary results depend on rounding
            let crosses = (lon_i > lon) != (lon_j > lon)
                && lat < (lat_j - lat_i) * (lon - lon_i) / (lon_j - lon_i) + lat_i;
            if crosses {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Bounding box as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        let ring: Vec<Coord<f64>> = self.vertices.iter().map(|v| Coord::from(*v)).collect();
        Polygon::new(LineString::new(ring), vec![])
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}

/// Circle in naive degree space: centre plus radius in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularZone {
    center: Coordinate,
    radius: f64,
}

impl CircularZone {
    pub fn new(center: Coordinate, radius: f64) -> Result<Self, ZoneError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(ZoneError::InvalidRadius(radius));
        }
        Ok(Self { center, radius })
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Strict: a point exactly `radius` away is outside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        point.degree_distance(&self.center) < self.radius
    }

    /// Bounding box as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bbox(&self) -> (f64, f64, f64, f64) {
        (
            self.center.lon - self.radius,
            self.center.lat - self.radius,
            self.center.lon + self.radius,
            self.center.lat + self.radius,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Zone {
    Polygon(PolygonZone),
    Circle(CircularZone),
}

/// Shape tag used in API responses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Polygon,
    Circle,
}

impl Zone {
    pub fn contains(&self, point: &Coordinate) -> bool {
        match self {
            Zone::Polygon(polygon) => polygon.contains(point),
            Zone::Circle(circle) => circle.contains(point),
        }
    }

    pub fn kind(&self) -> ZoneKind {
        match self {
            Zone::Polygon(_) => ZoneKind::Polygon,
            Zone::Circle(_) => ZoneKind::Circle,
        }
    }

    /// Bounding box as `(min_lon, min_lat, max_lon, max_lat)`
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        match self {
            Zone::Polygon(polygon) => polygon.bbox(),
            Zone::Circle(circle) => Some(circle.bbox()),
        }
    }
}

impl From<PolygonZone> for Zone {
    fn from(value: PolygonZone) -> Self {
        Zone::Polygon(value)
    }
}

impl From<CircularZone> for Zone {
    fn from(value: CircularZone) -> Self {
        Zone::Circle(value)
    }
}
