//! Core data models shared by the zone engine, geocoder and session.

pub mod city;
pub mod coordinate;
pub mod suggestion;

pub use city::{City, UnknownCity};
pub use coordinate::Coordinate;
pub use suggestion::AddressSuggestion;
