//! Background removal endpoint
//!
//! POST /api/remove-background - Strip the background from a data URL image

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::images::{self, parse_data_url};

/// Request bodies carry whole images, so allow more than axum's 2 MB default
pub const MAX_IMAGE_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Build the images router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/remove-background", post(remove_background))
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BODY_BYTES))
}

#[derive(Debug, Deserialize)]
pub struct RemoveBackgroundRequest {
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RemoveBackgroundResponse {
    pub success: bool,
    /// Result as a data URL
    pub image: String,
}

/// POST /api/remove-background
async fn remove_background(
    State(state): State<AppState>,
    payload: Result<Json<RemoveBackgroundRequest>, JsonRejection>,
) -> ApiResult<Json<RemoveBackgroundResponse>> {
    let Json(request) = payload?;
    let image = request
        .image
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("No image provided"))?;

    let parsed = parse_data_url(&image)?;

    let mime_type = Some(parsed.mime_type.as_str());
    let edited = images::remove_background(&state.gemini, &parsed.data, mime_type)
        .await
        .map_err(|e| {
            error!("Remove background error: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(RemoveBackgroundResponse {
        success: true,
        image: edited.to_data_url().to_string(),
    }))
}
