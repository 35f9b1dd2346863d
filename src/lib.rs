//! Perimeter - delivery zone checker for Moscow (MKAD) and Saint Petersburg (KAD)
//!
//! This library provides the zone containment engine plus the geocoding and
//! session plumbing shared by the server and CLI binaries.

pub mod config;
pub mod geocoder;
pub mod models;
pub mod session;
pub mod zone;

pub use models::{AddressSuggestion, City, Coordinate};
pub use zone::{ContainmentEngine, ZoneRegistry, ZoneVerdict};
