//! Yandex HTTP Geocoder client.

use futures::future::{BoxFuture, FutureExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{GeocodeError, Geocoder};
use crate::config::GeocoderConfig;
use crate::models::{AddressSuggestion, City, Coordinate};

/// Geocoder backed by the Yandex HTTP Geocoder API
pub struct YandexGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
    results: usize,
    lang: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    response: ResponseBody,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(rename = "GeoObjectCollection")]
    collection: GeoObjectCollection,
}

#[derive(Debug, Deserialize)]
struct GeoObjectCollection {
    #[serde(rename = "featureMember", default)]
    members: Vec<FeatureMember>,
}

#[derive(Debug, Deserialize)]
struct FeatureMember {
    #[serde(rename = "GeoObject")]
    geo_object: GeoObject,
}

#[derive(Debug, Deserialize)]
struct GeoObject {
    name: Option<String>,
    #[serde(rename = "metaDataProperty")]
    meta: Option<MetaDataProperty>,
    #[serde(rename = "Point")]
    point: GeoPointPos,
}

#[derive(Debug, Deserialize)]
struct MetaDataProperty {
    #[serde(rename = "GeocoderMetaData")]
    geocoder: GeocoderMetaData,
}

#[derive(Debug, Deserialize)]
struct GeocoderMetaData {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeoPointPos {
    /// "lon lat"
    pos: String,
}

impl YandexGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let api_key = config
            .resolve_api_key()
            .ok_or(GeocodeError::MissingApiKey)?;
        let endpoint = Url::parse(&config.endpoint)?;
        let client = Client::builder()
            .user_agent("Perimeter/0.1 (delivery zone checker)")
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            results: config.results,
            lang: config.lang.clone(),
        })
    }

    fn request_url(&self, city: City, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("apikey", &self.api_key)
            .append_pair("geocode", &format!("{}, {}", city.name_ru(), query))
            .append_pair("format", "json")
            .append_pair("results", &self.results.to_string())
            .append_pair("lang", &self.lang);
        url
    }

    async fn fetch(&self, city: City, query: &str) -> Result<Vec<AddressSuggestion>, GeocodeError> {
        let response = self.client.get(self.request_url(city, query)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!("Geocoder request failed with status {}: {}", status, body);
            return Err(GeocodeError::Status { status, body });
        }

        let data: GeocodeResponse = response.json().await?;
        let suggestions = parse_suggestions(data)?;
        debug!(
            "Geocoder returned {} candidates for {:?} in {}",
            suggestions.len(),
            query,
            city
        );
        Ok(suggestions)
    }
}

impl Geocoder for YandexGeocoder {
    fn suggest<'a>(
        &'a self,
        city: City,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<AddressSuggestion>, GeocodeError>> {
        self.fetch(city, query).boxed()
    }
}

fn parse_suggestions(data: GeocodeResponse) -> Result<Vec<AddressSuggestion>, GeocodeError> {
    data.response
        .collection
        .members
        .into_iter()
        .map(|member| {
            let object = member.geo_object;
            let coordinate = parse_pos(&object.point.pos)?;
            // Full address line, or the short name when metadata is absent
            let name = object
                .meta
                .and_then(|m| m.geocoder.text)
                .or(object.name)
                .unwrap_or_default();
            Ok(AddressSuggestion { name, coordinate })
        })
        .collect()
}

/// Parse a Yandex "lon lat" position into a coordinate
fn parse_pos(pos: &str) -> Result<Coordinate, GeocodeError> {
    let mut parts = pos.split_whitespace().map(str::parse::<f64>);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(lon)), Some(Ok(lat)), None) => Ok(Coordinate { lat, lon }),
        _ => Err(GeocodeError::MalformedPosition(pos.to_string())),
    }
}
