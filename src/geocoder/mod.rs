//! Address resolution collaborators.
//!
//! The zone engine never calls these directly: callers resolve free text to
//! candidate coordinates first, then ask the engine about a chosen one.

mod fixed;
mod yandex;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::models::{AddressSuggestion, City};

pub use fixed::StaticGeocoder;
pub use yandex::YandexGeocoder;

/// Environment variable holding the Yandex Maps API key
pub const API_KEY_ENV: &str = "YANDEX_MAPS_API_KEY";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoder API key is not set (config or YANDEX_MAPS_API_KEY)")]
    MissingApiKey,
    #[error("Invalid geocoder endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Geocoder returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed position in geocoder response: {0:?}")]
    MalformedPosition(String),
}

/// Turns a free-text query into ranked address candidates within a city.
pub trait Geocoder: Send + Sync {
    fn suggest<'a>(
        &'a self,
        city: City,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<AddressSuggestion>, GeocodeError>>;
}

/// Whether a query is long enough to be sent to a geocoder.
///
/// Length is counted in characters, not bytes, since queries are mostly Cyrillic.
pub fn is_query_long_enough(query: &str, min_len: usize) -> bool {
    query.chars().count() >= min_len
}
