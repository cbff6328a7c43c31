use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::MedcardError;

/// `axum::Json` whose rejections use the service's error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(MedcardError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for MedcardError {
    fn from(rejection: JsonRejection) -> Self {
        map_json_rejection(rejection)
    }
}

fn map_json_rejection(rejection: JsonRejection) -> MedcardError {
    match rejection {
        JsonRejection::JsonDataError(err) => {
            let message = err.body_text();
            if let Some(field) = extract_missing_field(&message) {
                MedcardError::Validation(format!("Missing required field: {field}"))
            } else {
                MedcardError::Validation(format!("Invalid JSON: {message}"))
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            MedcardError::Validation(format!("JSON syntax error: {err}"))
        }
        JsonRejection::MissingJsonContentType(_) => {
            MedcardError::Validation("Missing `Content-Type: application/json` header".to_string())
        }
        JsonRejection::BytesRejection(err) => {
            MedcardError::Validation(format!("Failed to read request body: {err}"))
        }
        _ => MedcardError::Validation(rejection.to_string()),
    }
}

fn extract_missing_field(message: &str) -> Option<&str> {
    let prefix = "missing field `";
    let start = message.find(prefix)? + prefix.len();
    let remaining = message.get(start..)?;
    let end = remaining.find('`')?;
    remaining.get(..end)
}
