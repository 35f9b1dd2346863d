//! Delivery zone server.
//!
//! Provides HTTP API for checking coordinates against the city delivery zones
//! and for address autocomplete annotated with the zone verdict.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use perimeter::config::Config;
use perimeter::geocoder::{GeocodeError, Geocoder, YandexGeocoder};
use perimeter::{ContainmentEngine, ZoneRegistry};

mod handlers;
use handlers::{autocomplete_handler, check_handler, health_handler, zones_handler, AppState};

#[derive(Parser, Debug)]
#[command(name = "perimeter-server")]
#[command(about = "Delivery zone check server")]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides the config file)
    #[arg(short, long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_ref())?;
    let listen = args.listen.unwrap_or_else(|| config.server.listen.clone());

    info!("Perimeter Zone Server");

    let engine = ContainmentEngine::new(ZoneRegistry::shared());

    let geocoder: Option<Arc<dyn Geocoder>> = match YandexGeocoder::new(&config.geocoder) {
        Ok(geocoder) => {
            info!("Geocoder endpoint: {}", config.geocoder.endpoint);
            Some(Arc::new(geocoder))
        }
        Err(GeocodeError::MissingApiKey) => {
            warn!("API key not set, autocomplete is disabled");
            None
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Failed to create geocoder")),
    };

    let state = Arc::new(AppState {
        engine,
        geocoder,
        suggest: config.suggest.clone(),
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/zones", get(zones_handler))
        .route("/v1/check", get(check_handler))
        .route("/v1/autocomplete", get(autocomplete_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind {}", listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
