//! Supported delivery cities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A city with a delivery zone.
///
/// The set is closed: every city maps to exactly one zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum City {
    /// Moscow, zone bounded by the MKAD ring road
    #[default]
    #[serde(rename = "moscow")]
    Moscow,
    /// Saint Petersburg, zone approximating the KAD ring road
    #[serde(rename = "spb")]
    SaintPetersburg,
}

#[derive(Debug, Error)]
#[error("Unknown city: {0}")]
pub struct UnknownCity(pub String);

impl City {
    /// Get all cities in display order
    pub fn all() -> &'static [City] {
        &[City::Moscow, City::SaintPetersburg]
    }

    /// Short identifier used in URLs and config
    pub fn id(&self) -> &'static str {
        match self {
            City::Moscow => "moscow",
            City::SaintPetersburg => "spb",
        }
    }

    /// Russian name, used as the geocoder query prefix
    pub fn name_ru(&self) -> &'static str {
        match self {
            City::Moscow => "Москва",
            City::SaintPetersburg => "Санкт-Петербург",
        }
    }

    /// Russian name in the locative case ("в Москве")
    pub fn locative_ru(&self) -> &'static str {
        match self {
            City::Moscow => "Москве",
            City::SaintPetersburg => "Санкт-Петербурге",
        }
    }

    /// Name of the ring road bounding the delivery zone
    pub fn zone_name(&self) -> &'static str {
        match self {
            City::Moscow => "МКАД",
            City::SaintPetersburg => "КАД",
        }
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl std::str::FromStr for City {
    type Err = UnknownCity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "moscow" | "msk" => Ok(City::Moscow),
            "spb" | "saint-petersburg" | "saint_petersburg" => Ok(City::SaintPetersburg),
            _ => Err(UnknownCity(s.to_string())),
        }
    }
}
