use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use plainlaw_core::{
    completion::CompletionOutcome, prompt::build_simplify_prompt, PipelineError,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::AppState;

/// Sentence sent by `/api/test-completion`.
const PROBE_SENTENCE: &str = "This Agreement shall be governed by the laws of India.";

type ApiError = (StatusCode, Json<Value>);

// ── Error helpers ─────────────────────────────────────────────────────────

fn error_body(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

pub(crate) fn pipeline_error(e: PipelineError) -> ApiError {
    match e {
        PipelineError::EmptyInput => error_body(StatusCode::BAD_REQUEST, e),
        other => {
            tracing::error!("processing failed: {other}");
            error_body(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Processing failed: {other}"),
            )
        },
    }
}

// ── Request body types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(crate) struct TextBody {
    #[serde(default)]
    pub text: String,
}

// ── Router ────────────────────────────────────────────────────────────────

pub(crate) fn router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/simplify", post(simplify))
        .route("/api/clauses", post(clauses))
        .route("/api/test-completion", post(test_completion))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Handlers ──────────────────────────────────────────────────────────────

pub(crate) async fn index() -> Json<Value> {
    Json(json!({
        "message": "Legal document simplifier API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/api/health": "GET - health check",
            "/api/analyze": "POST {text} - simplify and detect clauses",
            "/api/simplify": "POST {text} - plain-language rewrite only",
            "/api/clauses": "POST {text} - clause report only",
            "/api/test-completion": "POST - probe the completion backend",
        }
    }))
}

pub(crate) async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub(crate) async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Result<Json<Value>, ApiError> {
    let analysis = state.analyzer.analyze(&body.text).await.map_err(pipeline_error)?;
    Ok(Json(json!({
        "success": true,
        "original_text": analysis.original_text,
        "simplified_text": analysis.simplified_text,
        "important_clauses": analysis.important_clauses,
        "analyzed_at": analysis.analyzed_at.to_rfc3339(),
    })))
}

pub(crate) async fn simplify(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Result<Json<Value>, ApiError> {
    let simplified = state.analyzer.simplify(&body.text).await.map_err(pipeline_error)?;
    Ok(Json(json!({ "simplified_text": simplified })))
}

pub(crate) async fn clauses(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TextBody>,
) -> Result<Json<Value>, ApiError> {
    let report = state.analyzer.detect(&body.text).await.map_err(pipeline_error)?;
    Ok(Json(json!(report)))
}

pub(crate) async fn test_completion(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let prompt = build_simplify_prompt(PROBE_SENTENCE);
    let options = &state.analyzer.simplifier().settings().completion;
    match state.client.complete(&prompt, options).await {
        CompletionOutcome::Success(text) => {
            info!(backend = state.client.name(), "completion probe succeeded");
            Ok(Json(json!({ "simplified_text": text.trim() })))
        },
        CompletionOutcome::Failure(reason) => {
            tracing::warn!(backend = state.client.name(), "completion probe failed: {reason}");
            Err(error_body(StatusCode::BAD_GATEWAY, reason))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use plainlaw_core::{
        analysis::DocumentAnalyzer,
        completion::{CompletionClient, CompletionOptions},
        error::PipelineResult,
        segment::{SentenceSegmenter, UnicodeSegmenter},
        simplifier::SimplifierSettings,
    };
    use tower::ServiceExt;

    struct FixedClient(CompletionOutcome);

    #[async_trait]
    impl CompletionClient for FixedClient {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> CompletionOutcome {
            self.0.clone()
        }
    }

    struct BrokenSegmenter;

    impl SentenceSegmenter for BrokenSegmenter {
        fn segment(&self, _text: &str) -> PipelineResult<Vec<String>> {
            Err(PipelineError::Segmentation("no model".into()))
        }
    }

    const LEASE: &str = "The Tenant may terminate this lease within 30 days of notice. \
                         Rent payment is due on the first day of each month.";

    fn app_with(outcome: CompletionOutcome, segmenter: Arc<dyn SentenceSegmenter>, max_body: usize) -> Router {
        let client: Arc<dyn CompletionClient> = Arc::new(FixedClient(outcome));
        let analyzer = DocumentAnalyzer::new(
            Arc::clone(&client),
            segmenter,
            SimplifierSettings {
                retry_attempts: 1,
                ..SimplifierSettings::default()
            },
        )
        .unwrap();
        router(Arc::new(AppState { analyzer, client }), max_body)
    }

    fn app(outcome: CompletionOutcome) -> Router {
        app_with(outcome, Arc::new(UnicodeSegmenter), 16 * 1024 * 1024)
    }

    fn plain() -> CompletionOutcome {
        CompletionOutcome::Success("You can end the lease with 30 days notice. Rent is due monthly.".into())
    }

    async fn call(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = call(app(plain()), "GET", "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn index_lists_endpoints() {
        let (status, body) = call(app(plain()), "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["/api/analyze"].is_string());
    }

    #[tokio::test]
    async fn analyze_returns_rewrite_and_clauses() {
        let (status, body) =
            call(app(plain()), "POST", "/api/analyze", Some(json!({ "text": LEASE }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["original_text"], LEASE);
        assert!(body["simplified_text"].as_str().unwrap().starts_with("You can end the lease"));
        let clauses = &body["important_clauses"]["clauses"];
        assert_eq!(clauses["termination"][0]["risk_level"], "LOW");
        assert_eq!(clauses["deadlines"][0]["date_text"], "within 30 days");
        assert!(body["important_clauses"]["total_important_clauses"].as_u64().unwrap() >= 3);
    }

    #[tokio::test]
    async fn blank_text_is_a_bad_request() {
        for body in [json!({ "text": "  " }), json!({})] {
            let (status, body) = call(app(plain()), "POST", "/api/analyze", Some(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "could not extract text from the document");
        }
    }

    #[tokio::test]
    async fn pipeline_failures_are_server_errors() {
        let app = app_with(plain(), Arc::new(BrokenSegmenter), 1024 * 1024);
        let (status, body) = call(app, "POST", "/api/clauses", Some(json!({ "text": LEASE }))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().starts_with("Processing failed"));
    }

    #[tokio::test]
    async fn simplify_falls_back_when_backend_fails() {
        let app = app(CompletionOutcome::Failure("quota exceeded".into()));
        let (status, body) = call(app, "POST", "/api/simplify", Some(json!({ "text": LEASE }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["simplified_text"], LEASE);
    }

    #[tokio::test]
    async fn clauses_endpoint_returns_report_only() {
        let (status, body) =
            call(app(plain()), "POST", "/api/clauses", Some(json!({ "text": LEASE }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["clauses"]["payment"].is_array());
        assert!(body["insights"].is_array());
        assert!(body.get("simplified_text").is_none());
    }

    #[tokio::test]
    async fn completion_probe_reports_backend_state() {
        let (status, body) = call(app(plain()), "POST", "/api/test-completion", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["simplified_text"].is_string());

        let down = app(CompletionOutcome::Failure("connection refused".into()));
        let (status, body) = call(down, "POST", "/api/test-completion", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "connection refused");
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let app = app_with(plain(), Arc::new(UnicodeSegmenter), 64);
        let text = "a".repeat(200);
        let (status, _) = call(app, "POST", "/api/analyze", Some(json!({ "text": text }))).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
