mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use medcard::api::{create_router, AppState};
use medcard::ocr::{OcrProvider, RecognitionMode};

use common::{card_png_base64, scripted_provider, test_config, ModeScriptedEngine};

async fn post_ocr(provider: OcrProvider, body: String) -> (StatusCode, serde_json::Value) {
    let app = create_router(AppState::new(test_config(), provider));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process_ocr")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn image_body(encoded: &str) -> String {
    serde_json::json!({ "image": encoded }).to_string()
}

#[tokio::test]
async fn test_recognized_number_is_returned() {
    let provider = scripted_provider(
        ModeScriptedEngine::default().answer(RecognitionMode::SingleWordDigits, "3912171035"),
    );

    let (status, json) = post_ocr(provider, image_body(&card_png_base64())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["patient_number"], "3912171035");
    assert_eq!(json["method"], "otsu_median/single_word_digits");
    assert_eq!(json["pattern_type"], "exact_token");
}

#[tokio::test]
async fn test_card_layout_found_without_early_acceptance() {
    let provider = scripted_provider(
        ModeScriptedEngine::default().answer(RecognitionMode::SparseText, "Nr 39.1217-193.06"),
    );

    let (status, json) = post_ocr(provider, image_body(&card_png_base64())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["patient_number"], "3912171035");
    assert_eq!(json["method"], "otsu_median/sparse_text");
    assert_eq!(json["pattern_type"], "medical_card_calibrated");
}

#[tokio::test]
async fn test_data_url_payload_is_accepted() {
    let provider = scripted_provider(
        ModeScriptedEngine::default().answer(RecognitionMode::Block, "ID 1234567890"),
    );
    let encoded = format!("data:image/png;base64,{}", card_png_base64());

    let (status, json) = post_ocr(provider, image_body(&encoded)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["patient_number"], "1234567890");
}

#[tokio::test]
async fn test_no_number_is_a_200_with_diagnostics() {
    let provider = scripted_provider(
        ModeScriptedEngine::default().answer(RecognitionMode::Block, "12 34 56 78 9"),
    );

    let (status, json) = post_ocr(provider, image_body(&card_png_base64())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["raw_text"], "12 34 56 78 9");
    assert_eq!(json["total_digits"], 9);
    assert_eq!(
        json["found_numbers"],
        serde_json::json!(["12", "34", "56", "78", "9"])
    );
}

#[tokio::test]
async fn test_unavailable_engine_degrades_to_empty_result() {
    let provider = OcrProvider::unavailable("tesseract not installed");

    let (status, json) = post_ocr(provider, image_body(&card_png_base64())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], false);
    assert_eq!(json["raw_text"], "");
    assert_eq!(json["total_digits"], 0);
}

#[tokio::test]
async fn test_invalid_base64_is_a_500() {
    let provider = OcrProvider::unavailable("unused");

    let (status, json) = post_ocr(provider, image_body("not base64 !!")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to decode image"));
}

#[tokio::test]
async fn test_non_image_bytes_are_a_500() {
    let provider = OcrProvider::unavailable("unused");
    let encoded = base64::Engine::encode(
        &base64::engine::general_purpose::STANDARD,
        b"this is plain text",
    );

    let (status, json) = post_ocr(provider, image_body(&encoded)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_missing_image_field_is_a_400() {
    let provider = OcrProvider::unavailable("unused");

    let (status, json) = post_ocr(provider, r#"{"picture": "abc"}"#.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Validation error: Missing required field: image");
}

#[tokio::test]
async fn test_malformed_json_is_a_400() {
    let provider = OcrProvider::unavailable("unused");

    let (status, json) = post_ocr(provider, "{ not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_cors_preflight_is_allowed() {
    let app = create_router(AppState::new(
        test_config(),
        OcrProvider::unavailable("unused"),
    ));

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/process_ocr")
                .header("origin", "http://example.com")
                .header("access-control-request-method", "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}
