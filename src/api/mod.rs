//! HTTP API module - REST endpoints

pub mod error;
mod images;
mod laundry;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::gemini::{GeminiClient, GeminiError};
use crate::laundry::{OccupancyStore, StoreOptions};

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use images::MAX_IMAGE_BODY_BYTES;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub occupancy: Arc<OccupancyStore>,
    pub gemini: Arc<GeminiClient>,
}

impl AppState {
    /// Build the state from configuration
    pub fn new(config: &Config) -> Result<Self, GeminiError> {
        let occupancy = OccupancyStore::with_options(StoreOptions::from(&config.laundry));
        let gemini = GeminiClient::new(&config.gemini)?;

        Ok(Self {
            occupancy: Arc::new(occupancy),
            gemini: Arc::new(gemini),
        })
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(laundry::router())
        .merge(images::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "washd",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        gemini: if state.gemini.is_configured() {
            "configured"
        } else {
            "unconfigured"
        },
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    gemini: &'static str,
}
