use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use crate::error::ErrorResponse;
use crate::models::{MatchTier, PatientNumber, ScanFailure, ScanResult, ScanSuccess};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Medcard OCR API",
        version = "0.1.0",
        description = "Reads the 10-digit patient number from a photographed medical card.",
    ),
    paths(
        handlers::ocr::process_ocr,
        handlers::health::health_check,
        handlers::status::api_status,
    ),
    components(schemas(
        handlers::ocr::ProcessOcrRequest,
        ScanResult,
        ScanSuccess,
        ScanFailure,
        MatchTier,
        PatientNumber,
        ErrorResponse,
        handlers::health::HealthResponse,
        handlers::status::StatusResponse,
        handlers::status::EngineStatus,
    )),
    tags(
        (name = "ocr", description = "Patient number recognition"),
        (name = "health", description = "Liveness and engine status"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/api/docs", ApiDoc::openapi()).into()
}
