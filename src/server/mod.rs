//! Web server exposing report analysis over HTTP.
//!
//! Routes:
//! - `GET /` and `GET /health`: liveness
//! - `POST /api/analyze`: multipart upload (`file` field), returns an
//!   [`AnalysisResponse`](crate::models::AnalysisResponse)

mod error;
mod handlers;
mod routes;

pub use error::{ApiError, ErrorBody};
pub use routes::create_router;

use crate::analysis::Analyzer;
use crate::config::Settings;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let analyzer = Analyzer::from_config(&settings.llm)?;
        if !analyzer.model().is_available() {
            tracing::warn!("GEMINI_API_KEY not set, /api/analyze will serve sample data");
        }

        Ok(Self::with_analyzer(analyzer, settings.server.max_upload_bytes))
    }

    pub fn with_analyzer(analyzer: Analyzer, max_upload_bytes: usize) -> Self {
        Self {
            analyzer,
            max_upload_bytes,
        }
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    tracing::info!("Starting server at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::analysis::testing::ScriptedModel;

    const BOUNDARY: &str = "medilens-test-boundary";

    fn setup_test_app(model: Arc<ScriptedModel>) -> axum::Router {
        let state = AppState::with_analyzer(Analyzer::new(model), 1024 * 1024);
        create_router(state)
    }

    fn multipart_body(field: &str, file_name: &str, content_type: Option<&str>, data: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .into_bytes();
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let app = setup_test_app(Arc::new(ScriptedModel::unavailable()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "Medilens Backend Running");
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup_test_app(Arc::new(ScriptedModel::unavailable()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_analyze_without_credential() {
        let model = Arc::new(ScriptedModel::unavailable());
        let app = setup_test_app(model.clone());

        let body = multipart_body("file", "report.png", Some("image/png"), b"\x89PNG\r\n\x1a\n");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["is_mock"], true);
        assert_eq!(json["results"][0]["test_name"], "Hemoglobin");
        assert_eq!(json["results"][1]["test_name"], "WBC Count");
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_passes_media_type() {
        let model = Arc::new(ScriptedModel::replying(
            r#"{"results": [], "explanation": {"patient_summary": "p", "doctor_summary": "d",
                "recommendations_patient": [], "correlations_doctor": [], "confidence_score": 0.9}}"#,
        ));
        let app = setup_test_app(model.clone());

        let body = multipart_body("file", "scan.pdf", Some("application/pdf"), b"%PDF-1.4");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["is_mock"], false);
        assert_eq!(json["explanation"]["confidence_score"], 90.0);
        assert_eq!(model.last_media_type().as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_media_type_guessed_from_file_name() {
        let model = Arc::new(ScriptedModel::replying("not json"));
        let app = setup_test_app(model.clone());

        let body = multipart_body("file", "report.jpg", None, b"jpegdata");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(model.last_media_type().as_deref(), Some("image/jpeg"));
        let json = json_body(response).await;
        assert_eq!(json["is_mock"], true);
    }

    #[tokio::test]
    async fn test_analyze_missing_file_field() {
        let app = setup_test_app(Arc::new(ScriptedModel::unavailable()));

        let body = multipart_body("attachment", "report.png", Some("image/png"), b"data");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert!(json["detail"].as_str().unwrap().contains("file"));
    }

    #[tokio::test]
    async fn test_analyze_truncated_upload() {
        let model = Arc::new(ScriptedModel::unavailable());
        let app = setup_test_app(model.clone());

        // Part starts but the closing boundary never arrives.
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"report.png\"\r\nContent-Type: image/png\r\n\r\npartial"
        );
        let response = app.oneshot(upload_request(body.into_bytes())).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(!json["detail"].as_str().unwrap().is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_serve_resolves_host_names() {
        let settings = Settings::default();

        // Still running after the timeout means the bind succeeded.
        let result =
            tokio::time::timeout(Duration::from_millis(300), serve(&settings, "localhost", 0))
                .await;
        assert!(result.is_err(), "serve exited early: {:?}", result);
    }

    #[tokio::test]
    async fn test_analyze_rejects_non_multipart_body() {
        let model = Arc::new(ScriptedModel::unavailable());
        let app = setup_test_app(model.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/analyze")
                    .body(Body::from("x"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_body(response).await;
        assert!(!json["detail"].as_str().unwrap().is_empty());
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_panicking_analysis_returns_server_error() {
        let model = Arc::new(ScriptedModel::panicking());
        let app = setup_test_app(model.clone());

        let body = multipart_body("file", "report.png", Some("image/png"), b"data");
        let response = app.oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_body(response).await;
        assert!(!json["detail"].as_str().unwrap().is_empty());
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = setup_test_app(Arc::new(ScriptedModel::unavailable()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }
}
