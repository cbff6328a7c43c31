use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::extractors::AppJson;
use crate::api::AppState;
use crate::error::{ErrorResponse, Result};
use crate::models::ScanResult;

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct ProcessOcrRequest {
    /// Base64 encoded card photo. A `data:image/...;base64,` prefix is accepted.
    pub image: String,
}

/// `POST /process_ocr`
///
/// Always 200 when the image could be decoded, including when no patient
/// number was found (`success: false` with diagnostics).
#[utoipa::path(
    post,
    path = "/process_ocr",
    tag = "ocr",
    request_body = ProcessOcrRequest,
    responses(
        (status = 200, description = "Scan outcome", body = ScanResult),
        (status = 400, description = "Malformed request body", body = ErrorResponse),
        (status = 500, description = "Image could not be decoded or processed", body = ErrorResponse),
    )
)]
pub async fn process_ocr(
    State(state): State<AppState>,
    AppJson(req): AppJson<ProcessOcrRequest>,
) -> Result<Json<ScanResult>> {
    let result = state.scanner.scan_base64(&req.image).await?;
    Ok(Json(result))
}
