//! Zone membership checks for resolved coordinates.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::ZoneRegistry;
use crate::models::{City, Coordinate};

/// Result of a zone check, as reported by the server and CLI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneVerdict {
    pub city: City,
    pub zone: &'static str,
    pub coordinate: Coordinate,
    pub inside: bool,
}

/// Decides whether a coordinate lies in a city's delivery zone.
///
/// Stateless apart from the shared, read-only registry. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ContainmentEngine {
    registry: Arc<ZoneRegistry>,
}

impl ContainmentEngine {
    pub fn new(registry: Arc<ZoneRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Ray casting for polygon zones, planar radius test for circular zones
    pub fn is_inside(&self, city: City, point: Coordinate) -> bool {
        self.registry.zone_for(city).contains(&point)
    }

    pub fn check(&self, city: City, point: Coordinate) -> ZoneVerdict {
        let inside = self.is_inside(city, point);
        debug!("Zone check {} at ({}): inside={}", city, point, inside);
        ZoneVerdict {
            city,
            zone: city.zone_name(),
            coordinate: point,
            inside,
        }
    }
}

impl Default for ContainmentEngine {
    fn default() -> Self {
        Self::new(ZoneRegistry::shared())
    }
}
