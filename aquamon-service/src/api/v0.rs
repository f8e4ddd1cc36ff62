//! API v0 endpoints.
//!
//! Version 0 signals an unstable API -- breaking changes are expected
//! until the service reaches 1.0.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::server::SharedState;
use crate::api_client::types::{ErrorResponse, ReportRequest, ReportResponse, TankStatus};
use crate::report;
use crate::tracing::prelude::*;

/// Build the v0 API routes with OpenAPI metadata.
pub fn routes() -> OpenApiRouter<SharedState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .routes(routes!(create_report))
        .routes(routes!(get_tanks))
}

/// Errors surfaced to API callers as `{error}` payloads.
///
/// Validation problems carry the caller's mistake verbatim; upstream
/// failures are reported generically, with the raw detail logged only.
#[derive(Debug)]
enum ApiError {
    Validation(String),
    Upstream,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Upstream => (
                StatusCode::BAD_GATEWAY,
                "report generation failed".to_string(),
            ),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = OK, description = "Server is running", body = String),
    ),
)]
async fn health() -> &'static str {
    "OK"
}

/// Generate a water-quality report from one sensor snapshot.
#[utoipa::path(
    post,
    path = "/report",
    tag = "report",
    request_body = ReportRequest,
    responses(
        (status = OK, description = "Generated report", body = ReportResponse),
        (status = BAD_REQUEST, description = "Required readings missing", body = ErrorResponse),
        (status = BAD_GATEWAY, description = "Text service failed", body = ErrorResponse),
    ),
)]
async fn create_report(
    State(state): State<SharedState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Some(sample) = request.sample() else {
        let missing = request.missing_fields();
        return Err(ApiError::Validation(format!(
            "missing required readings: {}",
            missing.join(", ")
        )));
    };

    let prompt = report::build_prompt(&sample);
    let text = state.generator.generate(&prompt).await.map_err(|e| {
        error!(error = %e, "report generation failed");
        ApiError::Upstream
    })?;

    Ok(Json(ReportResponse { report: text }))
}

/// Return the current per-tank monitor status.
#[utoipa::path(
    get,
    path = "/tanks",
    tag = "monitor",
    responses(
        (status = OK, description = "Per-tank status snapshot", body = Vec<TankStatus>),
    ),
)]
async fn get_tanks(State(state): State<SharedState>) -> Json<Vec<TankStatus>> {
    Json(state.tanks_rx.borrow().clone())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use axum::body::Body;
    use http::{Request, header};
    use http_body_util::BodyExt;
    use tokio::sync::watch;
    use tower::ServiceExt;

    use super::*;
    use crate::report::{GenerateError, ReportGenerator};

    struct StubGenerator {
        called: AtomicBool,
        fail: bool,
    }

    impl StubGenerator {
        fn ok() -> Arc<Self> {
            Arc::new(Self {
                called: AtomicBool::new(false),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                called: AtomicBool::new(false),
                fail: true,
            })
        }
    }

    #[async_trait]
    impl ReportGenerator for StubGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.called.store(true, Ordering::SeqCst);
            if self.fail {
                Err(GenerateError::Rejected(500))
            } else {
                Ok(format!("report for: {}", prompt.lines().next().unwrap_or("")))
            }
        }
    }

    fn test_app(
        generator: Arc<dyn ReportGenerator>,
        tanks: Vec<TankStatus>,
    ) -> axum::Router {
        let (_status_tx, tanks_rx) = watch::channel(tanks);
        let state = SharedState { generator, tanks_rx };
        let (router, _api) = OpenApiRouter::new()
            .nest("/api/v0", routes())
            .split_for_parts();
        router.with_state(state)
    }

    fn report_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v0/report")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let app = test_app(StubGenerator::ok(), Vec::new());
        let response = app
            .oneshot(Request::get("/api/v0/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn report_accepts_zero_valued_readings() {
        let generator = StubGenerator::ok();
        let app = test_app(generator.clone(), Vec::new());

        let response = app
            .oneshot(report_request(
                r#"{"TDS": 0, "Temperature": 20, "Turbidity": 1, "pH": 7}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: ReportResponse = serde_json::from_slice(&body).unwrap();
        assert!(parsed.report.starts_with("report for:"));
    }

    #[tokio::test]
    async fn report_rejects_missing_field_before_upstream_call() {
        let generator = StubGenerator::ok();
        let app = test_app(generator.clone(), Vec::new());

        let response = app
            .oneshot(report_request(
                r#"{"TDS": 100, "Temperature": 20, "Turbidity": 1}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(parsed.error.contains("pH"));
        assert!(!generator.called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn report_maps_upstream_failure_to_generic_error() {
        let app = test_app(StubGenerator::failing(), Vec::new());

        let response = app
            .oneshot(report_request(
                r#"{"TDS": 100, "Temperature": 20, "Turbidity": 1, "pH": 7}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.error, "report generation failed");
    }

    #[tokio::test]
    async fn tanks_returns_published_snapshot() {
        let tanks = vec![TankStatus {
            source: "sensorData".to_string(),
            level: 42.0,
            armed: false,
        }];
        let app = test_app(StubGenerator::ok(), tanks);

        let response = app
            .oneshot(Request::get("/api/v0/tanks").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: Vec<TankStatus> = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].level, 42.0);
    }
}
