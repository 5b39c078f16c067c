// Route handlers
// JSON bodies are parsed by hand so malformed input maps to a 400 `{error}` payload

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::models::{
    AiDetection, CombinedCheckResponse, DetectRequest, HealthResponse, PdfUploadResponse,
    SimilarityResponse, TextRequest,
};
use crate::services::detection::combined_check as run_combined_check;
use crate::services::pdf_text::extract_pdf;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{info, warn};

fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))
}

/// Missing and empty text are both rejected
fn require_text(text: Option<String>) -> Result<String, ApiError> {
    match text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(ApiError::Validation("No text provided".to_string())),
    }
}

/// POST /api/hello-world/ - web similarity check
pub async fn hello_world(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SimilarityResponse>, ApiError> {
    let request: TextRequest = parse_json(&body)?;
    let text = require_text(request.text)?;

    let checker = state
        .similarity_checker()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let report = checker
        .check(&text)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if report.search_results == 0 {
        return Err(ApiError::NotFound("No search results found".to_string()));
    }

    Ok(Json(report.into()))
}

/// POST /api/upload-pdf/ - multipart field `pdf`
pub async fn upload_pdf(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PdfUploadResponse>, ApiError> {
    let missing = || ApiError::Validation("No PDF file provided".to_string());
    let mut multipart = multipart.map_err(|e| {
        warn!("[API] upload rejected: {}", e);
        missing()
    })?;

    let mut pdf = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid upload: {}", e)))?
    {
        if field.name() == Some("pdf") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Invalid upload: {}", e)))?;
            pdf = Some(bytes);
            break;
        }
    }
    let bytes = pdf.ok_or_else(missing)?;
    let size = bytes.len();

    // Parsing is CPU-bound
    let extracted = tokio::task::spawn_blocking(move || extract_pdf(&bytes))
        .await
        .map_err(|e| ApiError::Internal(format!("Error processing PDF: {}", e)))?
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    if extracted.text.is_empty() {
        return Err(ApiError::Validation("Could not extract text from PDF".to_string()));
    }

    info!(
        "[API] pdf extracted: bytes={} pages={} chars={}",
        size,
        extracted.page_count,
        extracted.text.chars().count()
    );
    Ok(Json(PdfUploadResponse {
        text: extracted.text,
        page_count: extracted.page_count,
    }))
}

/// POST /api/detect-ai/
pub async fn detect_ai(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AiDetection>, ApiError> {
    let request: DetectRequest = parse_json(&body)?;
    let text = require_text(request.text)?;

    let detector = state
        .detector()
        .await
        .map_err(|e| ApiError::Internal(format!("Error detecting AI content: {}", e)))?;

    Ok(Json(detector.detect(&text, request.detailed).await))
}

/// POST /api/combined-check/
pub async fn combined_check(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CombinedCheckResponse>, ApiError> {
    let request: TextRequest = parse_json(&body)?;
    let text = require_text(request.text)?;

    let internal = |e: crate::services::CollaboratorError| {
        ApiError::Internal(format!("Error in combined check: {}", e))
    };
    let detector = state.detector().await.map_err(internal)?;
    let checker = state.similarity_checker().await.map_err(internal)?;

    Ok(Json(run_combined_check(detector, checker, &text).await))
}

/// GET /api/health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: (chrono::Utc::now() - state.startup_time).num_seconds(),
    })
}

/// Any method other than POST on the POST routes
pub async fn invalid_method() -> ApiError {
    ApiError::InvalidMethod
}
