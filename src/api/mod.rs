// HTTP API
// Axum router mounting the detection endpoints under /api

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::serve;
pub use state::AppState;

use axum::extract::{DefaultBodyLimit, Request};
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.server.max_upload_bytes;

    Router::new()
        .nest("/api", api_routes(upload_limit))
        .layer(middleware::from_fn(request_span))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes(upload_limit: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/hello-world/",
            post(handlers::hello_world).fallback(handlers::invalid_method),
        )
        .route(
            "/upload-pdf/",
            post(handlers::upload_pdf)
                .fallback(handlers::invalid_method)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/detect-ai/",
            post(handlers::detect_ai).fallback(handlers::invalid_method),
        )
        .route(
            "/combined-check/",
            post(handlers::combined_check).fallback(handlers::invalid_method),
        )
        .route("/health", get(handlers::health))
}

/// Wrap every request in a span carrying a fresh request id
async fn request_span(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        id = %request_id,
        method = %request.method(),
        path = %request.uri().path()
    );

    async move {
        let started = Instant::now();
        let mut response = next.run(request).await;
        info!(
            "[API] status={} elapsed_ms={}",
            response.status().as_u16(),
            started.elapsed().as_millis()
        );
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::config_store::AppConfig;
    use crate::services::testing::{result, FakeCollaborators, FakeFetcher, FakeSearch};
    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    const SOURCE: &str = "Photosynthesis converts light energy into chemical energy stored in glucose";

    fn fakes() -> FakeCollaborators {
        FakeCollaborators::new(
            FakeSearch::with_results(vec![
                result("https://plants.example"),
                result("https://broken.example"),
                result("https://other.example"),
            ]),
            FakeFetcher::default()
                .page("https://plants.example", SOURCE)
                .failing("https://broken.example")
                .page("https://other.example", "Volcanoes erupt molten rock"),
        )
    }

    fn router_with(collaborators: Arc<FakeCollaborators>) -> Router {
        create_router(Arc::new(AppState::new(AppConfig::default(), collaborators)))
    }

    fn json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
        axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_hello_world_reports_matches() {
        let body = json!({ "text": SOURCE }).to_string();
        let (status, json) = send(
            router_with(Arc::new(fakes())),
            json_request(Method::POST, "/api/hello-world/", &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["max_similarity_score"], 100.0);
        assert_eq!(json["top_link"], "https://plants.example");
        let results = json["all_results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["title"], "Title for https://plants.example");
        assert!(results[0]["snippet"].is_string());
    }

    #[tokio::test]
    async fn test_hello_world_without_results_is_404() {
        let collaborators = FakeCollaborators::new(FakeSearch::with_results(vec![]), FakeFetcher::default());
        let (status, json) = send(
            router_with(Arc::new(collaborators)),
            json_request(Method::POST, "/api/hello-world/", r#"{"text": "anything at all"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "No search results found");
    }

    #[tokio::test]
    async fn test_hello_world_search_failure_is_404() {
        let collaborators = FakeCollaborators::new(FakeSearch::failing(), FakeFetcher::default());
        let (status, json) = send(
            router_with(Arc::new(collaborators)),
            json_request(Method::POST, "/api/hello-world/", r#"{"text": "anything at all"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "No search results found");
    }

    #[tokio::test]
    async fn test_missing_or_empty_text_is_400() {
        for uri in ["/api/hello-world/", "/api/detect-ai/", "/api/combined-check/"] {
            for body in ["{}", r#"{"text": ""}"#, r#"{"text": null}"#] {
                let (status, json) = send(
                    router_with(Arc::new(fakes())),
                    json_request(Method::POST, uri, body),
                )
                .await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", uri, body);
                assert_eq!(json["error"], "No text provided");
            }
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let (status, json) = send(
            router_with(Arc::new(fakes())),
            json_request(Method::POST, "/api/detect-ai/", "{not json"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON body"));
    }

    #[tokio::test]
    async fn test_wrong_method_is_400() {
        for uri in ["/api/hello-world/", "/api/upload-pdf/", "/api/detect-ai/", "/api/combined-check/"] {
            let (status, json) = send(
                router_with(Arc::new(fakes())),
                json_request(Method::GET, uri, ""),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(json["error"], "Invalid request method");
        }
    }

    #[tokio::test]
    async fn test_detect_ai_short_text_has_null_probability() {
        let (status, json) = send(
            router_with(Arc::new(fakes())),
            json_request(Method::POST, "/api/detect-ai/", r#"{"text": "short text"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["ai_probability"].is_null());
        assert!(json["error"].as_str().unwrap().contains("minimum 50 words"));
    }

    #[tokio::test]
    async fn test_detect_ai_detailed_result() {
        let text = (0..12)
            .map(|i| format!("The committee reviewed item {} and approved it today", i))
            .collect::<Vec<_>>()
            .join(". ");
        let body = json!({ "text": text, "detailed": true }).to_string();
        let (status, json) = send(
            router_with(Arc::new(fakes())),
            json_request(Method::POST, "/api/detect-ai/", &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let probability = json["ai_probability"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&probability));
        assert!(json["verdict"].is_string());
        assert!(json["confidence_factors"].is_array());
        assert!(json["statistical_features"]["total_words"].is_u64());
    }

    #[tokio::test]
    async fn test_detector_handle_built_once() {
        let collaborators = Arc::new(fakes());
        let router = router_with(collaborators.clone());
        for _ in 0..3 {
            let (status, _) = send(
                router.clone(),
                json_request(Method::POST, "/api/detect-ai/", r#"{"text": "short text"}"#),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(collaborators.builds(), 1);
    }

    #[tokio::test]
    async fn test_embedder_init_failure_is_500_and_retried() {
        let mut collaborators = fakes();
        collaborators.embedder_unavailable = true;
        let collaborators = Arc::new(collaborators);
        let router = router_with(collaborators.clone());

        for _ in 0..2 {
            let (status, json) = send(
                router.clone(),
                json_request(Method::POST, "/api/hello-world/", r#"{"text": "some text"}"#),
            )
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert!(json["error"].as_str().unwrap().contains("unavailable"));
        }
        assert_eq!(collaborators.builds(), 2);
    }

    #[tokio::test]
    async fn test_combined_check_merges_both_flows() {
        let body = json!({ "text": SOURCE }).to_string();
        let (status, json) = send(
            router_with(Arc::new(fakes())),
            json_request(Method::POST, "/api/combined-check/", &body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["overall_verdict"], "Plagiarized");
        assert!(json["ai_detection"]["ai_probability"].is_null());
        assert_eq!(json["plagiarism_detection"]["max_similarity"], 100.0);
        assert_eq!(json["plagiarism_detection"]["top_match"], "https://plants.example");
        let matches = json["plagiarism_detection"]["all_matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches[0].get("snippet").is_none());
    }

    #[tokio::test]
    async fn test_upload_without_pdf_field_is_400() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{b}--\r\n",
            b = boundary
        );
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/upload-pdf/")
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let (status, json) = send(router_with(Arc::new(fakes())), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No PDF file provided");
    }

    #[tokio::test]
    async fn test_upload_non_multipart_is_400() {
        let (status, json) = send(
            router_with(Arc::new(fakes())),
            json_request(Method::POST, "/api/upload-pdf/", "{}"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No PDF file provided");
    }

    #[tokio::test]
    async fn test_upload_unreadable_pdf_is_500() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"pdf\"; filename=\"doc.pdf\"\r\nContent-Type: application/pdf\r\n\r\nthis is not a pdf\r\n--{b}--\r\n",
            b = boundary
        );
        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/upload-pdf/")
            .header("content-type", format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap();

        let (status, json) = send(router_with(Arc::new(fakes())), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().starts_with("Error processing PDF"));
    }

    #[tokio::test]
    async fn test_health_and_request_id() {
        let response = router_with(Arc::new(fakes()))
            .oneshot(json_request(Method::GET, "/api/health", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
