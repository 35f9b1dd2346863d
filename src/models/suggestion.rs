use serde::{Deserialize, Serialize};

use super::Coordinate;

/// A geocoder candidate: display name plus resolved coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub name: String,
    pub coordinate: Coordinate,
}

impl AddressSuggestion {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }
}
