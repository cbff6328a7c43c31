use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;
use crate::ocr::EngineCapability;

pub const FEATURES: [&str; 2] = ["ocr_scanning", "patient_number_recognition"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub features: Vec<String>,
    pub engine: EngineStatus,
    /// Why the engine could not be started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_reason: Option<String>,
}

/// `GET /api/status`
#[utoipa::path(
    get,
    path = "/api/status",
    tag = "health",
    responses(
        (status = 200, description = "Service and OCR engine status", body = StatusResponse),
    )
)]
pub async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let (engine, engine_reason) = match state.ocr().capability() {
        EngineCapability::Available => (EngineStatus::Available, None),
        EngineCapability::Unavailable { reason } => (EngineStatus::Unavailable, Some(reason)),
    };

    Json(StatusResponse {
        status: "active".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: FEATURES.iter().map(|f| f.to_string()).collect(),
        engine,
        engine_reason,
    })
}
