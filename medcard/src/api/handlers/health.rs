use axum::Json;
use serde::Serialize;

pub const SERVICE_NAME: &str = "OCR Patient Scanner";

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

/// `GET /health`
///
/// Liveness only. Reports healthy even when the OCR engine is unavailable;
/// see `/api/status` for engine state.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse),
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
    })
}
