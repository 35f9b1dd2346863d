//! Delivery zone geometry and containment engine.
//!
//! Moscow is bounded by the MKAD polygon and tested with ray casting,
//! Saint Petersburg is a circle tested with a planar distance in degrees.

mod engine;
mod mkad;
mod registry;
mod shape;

pub use engine::{ContainmentEngine, ZoneVerdict};
pub use mkad::MKAD_VERTICES;
pub use registry::{ZoneRegistry, SPB_CENTER, SPB_RADIUS};
pub use shape::{CircularZone, PolygonZone, Zone, ZoneError, ZoneKind};
