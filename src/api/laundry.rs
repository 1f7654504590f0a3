//! Laundry occupancy endpoints
//!
//! GET  /api/laundry/status        - All machines
//! GET  /api/laundry/machines/{id} - One machine
//! POST /api/laundry/claim         - Bind a session to a free machine
//! POST /api/laundry/update        - Patch the session's machine
//! POST /api/laundry/leave         - Release the session's machine

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::laundry::{Machine, MachineId, MachinePatch};

/// Build the laundry router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/laundry/status", get(status))
        .route("/api/laundry/machines/{id}", get(machine))
        .route("/api/laundry/claim", post(claim))
        .route("/api/laundry/update", post(update))
        .route("/api/laundry/leave", post(leave))
}

/// Request carrying only a session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Update request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub data: Option<MachinePatch>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub machines: Vec<Machine>,
}

#[derive(Debug, Serialize)]
pub struct MachineResponse {
    pub success: bool,
    pub machine: Machine,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub success: bool,
    pub machine_id: MachineId,
}

#[derive(Debug, Serialize)]
pub struct LeaveResponse {
    pub success: bool,
}

/// Empty session ids count as missing
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}

/// GET /api/laundry/status
async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        machines: state.occupancy.list_all(),
    })
}

/// GET /api/laundry/machines/{id}
async fn machine(
    State(state): State<AppState>,
    id: Result<Path<MachineId>, PathRejection>,
) -> ApiResult<Json<MachineResponse>> {
    let Path(id) = id?;
    let machine = state
        .occupancy
        .get(id)
        .ok_or_else(|| ApiError::not_found(format!("Machine {} not found", id)))?;

    Ok(Json(MachineResponse {
        success: true,
        machine,
    }))
}

/// POST /api/laundry/claim
async fn claim(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> ApiResult<Json<ClaimResponse>> {
    let Json(request) = payload?;
    let session_id =
        non_empty(request.session_id).ok_or_else(|| ApiError::bad_request("Session ID required"))?;

    let machine_id = state.occupancy.claim(&session_id)?;

    Ok(Json(ClaimResponse {
        success: true,
        machine_id,
    }))
}

/// POST /api/laundry/update
async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateRequest>, JsonRejection>,
) -> ApiResult<Json<MachineResponse>> {
    let Json(request) = payload?;
    let (Some(session_id), Some(patch)) = (non_empty(request.session_id), request.data) else {
        return Err(ApiError::bad_request("Missing parameters"));
    };

    let machine = state.occupancy.update(&session_id, &patch)?;

    Ok(Json(MachineResponse {
        success: true,
        machine,
    }))
}

/// POST /api/laundry/leave
///
/// Always succeeds, even when the session held nothing or the body is unreadable.
async fn leave(
    State(state): State<AppState>,
    payload: Result<Json<SessionRequest>, JsonRejection>,
) -> Json<LeaveResponse> {
    if let Some(session_id) = payload.ok().and_then(|Json(r)| non_empty(r.session_id)) {
        state.occupancy.leave(&session_id);
    }

    Json(LeaveResponse { success: true })
}
