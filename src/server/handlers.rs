//! HTTP handlers for zone checks and address autocomplete.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use perimeter::config::SuggestConfig;
use perimeter::geocoder::{is_query_long_enough, Geocoder};
use perimeter::zone::{Zone, ZoneKind};
use perimeter::{City, ContainmentEngine, Coordinate, ZoneVerdict};

/// Application state shared across handlers
pub struct AppState {
    pub engine: ContainmentEngine,
    /// `None` when no API key is configured
    pub geocoder: Option<Arc<dyn Geocoder>>,
    pub suggest: SuggestConfig,
}

type HandlerError = (StatusCode, String);

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    geocoder: bool,
}

/// Health check endpoint
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let geocoder = state.geocoder.is_some();
    Json(HealthResponse {
        status: if geocoder { "ok" } else { "degraded" },
        geocoder,
    })
}

#[derive(Debug, Serialize)]
pub struct ZoneSummary {
    city: City,
    name: &'static str,
    zone: &'static str,
    kind: ZoneKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    center: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    radius: Option<f64>,
    /// [minLon, minLat, maxLon, maxLat]
    #[serde(skip_serializing_if = "Option::is_none")]
    bbox: Option<[f64; 4]>,
}

#[derive(Debug, Serialize)]
pub struct ZonesResponse {
    zones: Vec<ZoneSummary>,
}

/// Zone metadata for every supported city
pub async fn zones_handler(State(state): State<Arc<AppState>>) -> Json<ZonesResponse> {
    let registry = state.engine.registry();
    let zones = City::all()
        .iter()
        .map(|&city| {
            let zone = registry.zone_for(city);
            let (vertices, center, radius) = match zone {
                Zone::Polygon(polygon) => (Some(polygon.vertices().len()), None, None),
                Zone::Circle(circle) => (None, Some(circle.center()), Some(circle.radius())),
            };
            ZoneSummary {
                city,
                name: city.name_ru(),
                zone: city.zone_name(),
                kind: zone.kind(),
                vertices,
                center,
                radius,
                bbox: zone.bbox().map(|(min_lon, min_lat, max_lon, max_lat)| {
                    [min_lon, min_lat, max_lon, max_lat]
                }),
            }
        })
        .collect();

    Json(ZonesResponse { zones })
}

#[derive(Deserialize)]
pub struct CheckQueryParams {
    /// City identifier ("moscow" or "spb")
    city: String,
    lat: f64,
    lon: f64,
}

/// Check a coordinate against a city's delivery zone
pub async fn check_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CheckQueryParams>,
) -> Result<Json<ZoneVerdict>, HandlerError> {
    let city = parse_city(&params.city)?;
    let verdict = state
        .engine
        .check(city, Coordinate::new(params.lat, params.lon));
    Ok(Json(verdict))
}

#[derive(Deserialize)]
pub struct AutocompleteQueryParams {
    city: String,
    /// Free-text address
    text: String,
}

#[derive(Debug, Serialize)]
pub struct AnnotatedSuggestion {
    name: String,
    coordinate: Coordinate,
    inside: bool,
}

#[derive(Debug, Serialize)]
pub struct AutocompleteResponse {
    city: City,
    zone: &'static str,
    features: Vec<AnnotatedSuggestion>,
}

/// Geocode free text and annotate every candidate with its zone verdict
pub async fn autocomplete_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AutocompleteQueryParams>,
) -> Result<Json<AutocompleteResponse>, HandlerError> {
    let city = parse_city(&params.city)?;
    let mut response = AutocompleteResponse {
        city,
        zone: city.zone_name(),
        features: Vec::new(),
    };

    if !is_query_long_enough(&params.text, state.suggest.min_query_len) {
        debug!("Autocomplete text {:?} too short, skipping geocoder", params.text);
        return Ok(Json(response));
    }

    let geocoder = state.geocoder.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "Geocoder is not configured".to_string(),
        )
    })?;

    let suggestions = geocoder.suggest(city, &params.text).await.map_err(|e| {
        error!("Autocomplete geocoding failed: {}", e);
        (StatusCode::BAD_GATEWAY, e.to_string())
    })?;

    response.features = suggestions
        .into_iter()
        .map(|s| AnnotatedSuggestion {
            inside: state.engine.is_inside(city, s.coordinate),
            name: s.name,
            coordinate: s.coordinate,
        })
        .collect();

    Ok(Json(response))
}

fn parse_city(value: &str) -> Result<City, HandlerError> {
    value
        .parse()
        .map_err(|e: perimeter::models::UnknownCity| (StatusCode::BAD_REQUEST, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use perimeter::geocoder::StaticGeocoder;
    use perimeter::AddressSuggestion;

    fn state(geocoder: Option<Arc<dyn Geocoder>>) -> Arc<AppState> {
        Arc::new(AppState {
            engine: ContainmentEngine::default(),
            geocoder,
            suggest: SuggestConfig::default(),
        })
    }

    fn moscow_geocoder() -> Arc<dyn Geocoder> {
        Arc::new(
            StaticGeocoder::new(5)
                .with_address(
                    City::Moscow,
                    AddressSuggestion::new(
                        "Россия, Москва, Тверская улица, 1",
                        Coordinate::new(55.757556, 37.611347),
                    ),
                )
                .with_address(
                    City::Moscow,
                    AddressSuggestion::new(
                        "Россия, Москва, Зеленоград, Тверская",
                        Coordinate::new(55.991893, 37.214390),
                    ),
                ),
        )
    }

    #[tokio::test]
    async fn test_check_inside_and_outside() {
        let Json(verdict) = check_handler(
            State(state(None)),
            Query(CheckQueryParams {
                city: "moscow".to_string(),
                lat: 55.75,
                lon: 37.61,
            }),
        )
        .await
        .unwrap();
        assert!(verdict.inside);
        assert_eq!(verdict.zone, "МКАД");

        let Json(verdict) = check_handler(
            State(state(None)),
            Query(CheckQueryParams {
                city: "spb".to_string(),
                lat: 55.75,
                lon: 37.61,
            }),
        )
        .await
        .unwrap();
        assert!(!verdict.inside);
    }

    #[tokio::test]
    async fn test_check_unknown_city() {
        let err = check_handler(
            State(state(None)),
            Query(CheckQueryParams {
                city: "kazan".to_string(),
                lat: 55.79,
                lon: 49.12,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_zones_describe_both_shapes() {
        let Json(response) = zones_handler(State(state(None))).await;
        assert_eq!(response.zones.len(), 2);

        let moscow = &response.zones[0];
        assert_eq!(moscow.kind, ZoneKind::Polygon);
        assert_eq!(moscow.vertices, Some(109));
        let [min_lon, min_lat, max_lon, max_lat] = moscow.bbox.unwrap();
        assert!(min_lon < 37.61 && 37.61 < max_lon);
        assert!(min_lat < 55.75 && 55.75 < max_lat);

        let spb = &response.zones[1];
        assert_eq!(spb.kind, ZoneKind::Circle);
        assert_eq!(spb.radius, Some(0.17));
        assert_eq!(spb.center, Some(Coordinate::new(59.9343, 30.3351)));
    }

    #[tokio::test]
    async fn test_autocomplete_annotates_verdicts() {
        let Json(response) = autocomplete_handler(
            State(state(Some(moscow_geocoder()))),
            Query(AutocompleteQueryParams {
                city: "moscow".to_string(),
                text: "Тверская".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.features.len(), 2);
        assert!(response.features[0].inside);
        assert!(!response.features[1].inside);
    }

    #[tokio::test]
    async fn test_autocomplete_short_text_is_empty() {
        let Json(response) = autocomplete_handler(
            State(state(None)),
            Query(AutocompleteQueryParams {
                city: "moscow".to_string(),
                text: "Тв".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(response.features.is_empty());
    }

    #[tokio::test]
    async fn test_autocomplete_without_geocoder() {
        let err = autocomplete_handler(
            State(state(None)),
            Query(AutocompleteQueryParams {
                city: "spb".to_string(),
                text: "Невский проспект".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_reports_geocoder() {
        let Json(health) = health_handler(State(state(None))).await;
        assert_eq!(health.status, "degraded");
        let Json(health) = health_handler(State(state(Some(moscow_geocoder())))).await;
        assert_eq!(health.status, "ok");
    }
}
