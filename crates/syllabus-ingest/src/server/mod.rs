//! HTTP server for syllabus ingestion

pub mod auth;
pub mod routes;
pub mod state;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use state::AppState;

/// Ingestion HTTP server
pub struct IngestServer {
    config: AppConfig,
    state: AppState,
}

impl IngestServer {
    /// Create a new server, wiring all collaborators from config
    pub async fn new(config: AppConfig) -> Result<Self> {
        let state = AppState::new(config.clone()).await?;
        Ok(Self { config, state })
    }

    /// Start the server
    pub async fn start(self) -> Result<()> {
        let addr: SocketAddr = self
            .address()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid address: {}", e)))?;

        let router = build_router(self.state);

        tracing::info!("Starting ingestion server on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.server.host, self.config.server.port)
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    let server = &state.config().server;

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/ingestion", routes::api_routes(server.max_upload_size))
        .layer(TraceLayer::new_for_http());

    if server.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::{EventRepublisher, FanOutCoordinator, IngestService};
    use crate::testing::{
        sample_pdf, RecordingPublisher, ScriptedGenerator, SpyBlobStore, SpyRepository,
    };
    use crate::generation::GenerationError;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "syllabus-test-boundary";

    struct TestApp {
        router: Router,
        blobs: Arc<SpyBlobStore>,
        repo: Arc<SpyRepository>,
    }

    fn app(generator: ScriptedGenerator) -> TestApp {
        let blobs = Arc::new(SpyBlobStore::default());
        let repo = Arc::new(SpyRepository::default());
        let service = IngestService::new(
            FanOutCoordinator::new(Arc::new(generator), None),
            blobs.clone(),
            repo.clone(),
            EventRepublisher::new(Arc::new(RecordingPublisher::default()), "syllabus", "unit"),
        );

        TestApp {
            router: build_router(AppState::from_parts(AppConfig::default(), service)),
            blobs,
            repo,
        }
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<&[u8]>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }
        if let Some(data) = file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"biology.pdf\"\r\nContent-Type: application/pdf\r\n\r\n",
                    BOUNDARY
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>, authenticated: bool) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/api/ingestion/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if authenticated {
            builder = builder
                .header(auth::USER_ID_HEADER, "t-1")
                .header(auth::USER_ROLE_HEADER, "teacher");
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn form() -> Vec<(&'static str, &'static str)> {
        vec![
            ("subject", "Biology"),
            ("role", "teacher"),
            ("num_3marks", "2"),
            ("num_4marks", "1"),
            ("num_10marks", "1"),
        ]
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_upload_success() {
        let test = app(ScriptedGenerator::new());
        let pdf = sample_pdf(&["UNIT 1 Cells", "UNIT 2 Genetics"]);

        let response = test
            .router
            .oneshot(upload_request(multipart_body(&form(), Some(&pdf)), true))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Material uploaded successfully");
        assert_eq!(body["questions"].as_array().unwrap().len(), 2);
        assert!(body["cloudinaryUrl"].as_str().unwrap().starts_with("mem://"));
        assert!(body["content_id"].as_str().is_some());
        assert_eq!(test.blobs.uploads(), 1);
        assert_eq!(test.repo.inserts(), 1);
    }

    #[tokio::test]
    async fn test_upload_generation_failure_is_500() {
        let test = app(ScriptedGenerator::new().failing_when_contains(
            "Genetics",
            GenerationError::Upstream {
                status: 503,
                body: "overloaded".to_string(),
            },
        ));
        let pdf = sample_pdf(&["UNIT 1 Cells", "UNIT 2 Genetics"]);

        let response = test
            .router
            .oneshot(upload_request(multipart_body(&form(), Some(&pdf)), true))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("failed to generate questions:"));
        assert!(message.contains("overloaded"));
        assert_eq!(test.blobs.uploads(), 0);
        assert_eq!(test.repo.inserts(), 0);
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_400() {
        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(upload_request(multipart_body(&form(), None), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_bad_count_is_400() {
        let mut fields = form();
        fields[2] = ("num_3marks", "many");
        let pdf = sample_pdf(&["UNIT 1 Cells"]);

        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(upload_request(multipart_body(&fields, Some(&pdf)), true))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_non_pdf_is_400() {
        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(upload_request(
                multipart_body(&form(), Some(b"plain text, not a pdf")),
                true,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "extraction_error");
    }

    #[tokio::test]
    async fn test_upload_requires_identity() {
        let pdf = sample_pdf(&["UNIT 1 Cells"]);
        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(upload_request(multipart_body(&form(), Some(&pdf)), false))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_reprocess_acknowledges_immediately() {
        let request = Request::post(format!("/api/ingestion/reprocess/{}", uuid::Uuid::new_v4()))
            .header(auth::USER_ID_HEADER, "t-1")
            .header(auth::USER_ROLE_HEADER, "teacher")
            .body(Body::empty())
            .unwrap();

        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(request)
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(
            body["message"],
            "material uploaded to ai for question generation"
        );
    }

    #[tokio::test]
    async fn test_reprocess_malformed_id_is_400() {
        let request = Request::post("/api/ingestion/reprocess/not-a-uuid")
            .header(auth::USER_ID_HEADER, "t-1")
            .header(auth::USER_ROLE_HEADER, "teacher")
            .body(Body::empty())
            .unwrap();

        let response = app(ScriptedGenerator::new())
            .router
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
