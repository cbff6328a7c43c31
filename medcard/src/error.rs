use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ocr::RecognitionMode;

#[derive(Error, Debug)]
pub enum MedcardError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Recognition failed in {mode} mode: {message}")]
    RecognitionConfig {
        mode: RecognitionMode,
        message: String,
    },

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Processing timed out after {0} seconds")]
    Timeout(u64),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for MedcardError {
    fn into_response(self) -> Response {
        let status = match &self {
            MedcardError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always `false`.
    pub success: bool,
    pub error: String,
}

pub type Result<T> = std::result::Result<T, MedcardError>;
