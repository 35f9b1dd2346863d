//! Static table of delivery zones, one per city.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use super::mkad::MKAD_VERTICES;
use super::{CircularZone, PolygonZone, Zone};
use crate::models::{City, Coordinate};

/// Centre of the Saint Petersburg zone (Palace Square)
pub const SPB_CENTER: Coordinate = Coordinate::new(59.9343, 30.3351);

/// Radius of the Saint Petersburg zone in degrees, compared against the planar
/// degree distance, not metres
pub const SPB_RADIUS: f64 = 0.17;

static BUILTIN: OnceLock<Arc<ZoneRegistry>> = OnceLock::new();

/// Immutable mapping from city to its delivery zone
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    moscow: Zone,
    saint_petersburg: Zone,
}

impl ZoneRegistry {
    /// Build the registry from the built-in zone data
    pub fn builtin() -> Self {
        let ring = MKAD_VERTICES
            .iter()
            .map(|&vertex| Coordinate::from(vertex))
            .collect();
        let moscow = PolygonZone::new(ring).expect("MKAD ring has more than 3 vertices");
        let saint_petersburg =
            CircularZone::new(SPB_CENTER, SPB_RADIUS).expect("SPB radius is positive");

        debug!(
            "Built zone registry: {} MKAD vertices, KAD radius {}",
            moscow.vertices().len(),
            SPB_RADIUS
        );

        Self::with_zones(moscow.into(), saint_petersburg.into())
    }

    /// Build a registry from explicit zones
    pub fn with_zones(moscow: Zone, saint_petersburg: Zone) -> Self {
        Self {
            moscow,
            saint_petersburg,
        }
    }

    /// Process-wide built-in registry, built on first use
    pub fn shared() -> Arc<ZoneRegistry> {
        Arc::clone(BUILTIN.get_or_init(|| Arc::new(Self::builtin())))
    }

    /// Get the zone bound to a city
    pub fn zone_for(&self, city: City) -> &Zone {
        match city {
            City::Moscow => &self.moscow,
            City::SaintPetersburg => &self.saint_petersburg,
        }
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::ZoneKind;

    #[test]
    fn test_builtin_shapes() {
        let registry = ZoneRegistry::builtin();
        assert_eq!(registry.zone_for(City::Moscow).kind(), ZoneKind::Polygon);
        assert_eq!(
            registry.zone_for(City::SaintPetersburg).kind(),
            ZoneKind::Circle
        );
    }

    #[test]
    fn test_mkad_ring_is_verbatim() {
        let registry = ZoneRegistry::builtin();
        let Zone::Polygon(mkad) = registry.zone_for(City::Moscow) else {
            panic!("Moscow zone must be a polygon");
        };
        assert_eq!(mkad.vertices().len(), 109);
        assert_eq!(mkad.vertices()[0], Coordinate::new(55.774558, 37.842762));
        assert_eq!(mkad.vertices()[31], Coordinate::new(55.574732, 37.616719));
        assert_eq!(mkad.vertices().first(), mkad.vertices().last());
    }

    #[test]
    fn test_spb_circle_constants() {
        let registry = ZoneRegistry::builtin();
        let Zone::Circle(kad) = registry.zone_for(City::SaintPetersburg) else {
            panic!("Saint Petersburg zone must be a circle");
        };
        assert_eq!(kad.center(), Coordinate::new(59.9343, 30.3351));
        assert_eq!(kad.radius(), 0.17);
    }

    #[test]
    fn test_shared_is_reused() {
        let a = ZoneRegistry::shared();
        let b = ZoneRegistry::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
