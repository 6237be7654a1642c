//! HTTP API gateway for AlgoViz.
//!
//! Exposes the pipeline over a small JSON API:
//! - `GET /` service status and whether a model is configured
//! - `GET /health` liveness
//! - `POST /api/process-query` one pipeline pass per request
//!
//! Built on Axum with CORS, a body-size limit and HTTP tracing.

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use algoviz_config::AppConfig;
use algoviz_core::{ConversationTurn, QueryResult};
use algoviz_pipeline::Pipeline;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub config: AppConfig,
    pub pipeline: Arc<Pipeline>,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origins);
    let body_limit = state.config.gateway.body_limit_bytes;

    Router::new()
        .route("/", get(status_handler))
        .route("/health", get(health_handler))
        .route("/api/process-query", post(process_query_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

/// Start the gateway HTTP server.
///
/// The provider is built once here and shared by every request.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = algoviz_providers::build_from_config(&config);
    let pipeline = Arc::new(Pipeline::from_config(&config, provider));
    let configured = pipeline.is_configured();

    let state = Arc::new(GatewayState { config, pipeline });
    let app = build_router(state);

    info!(addr = %addr, configured, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    version: &'static str,
    provider: String,
    model: String,
    configured: bool,
}

async fn status_handler(State(state): State<SharedState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "AlgoViz API is running",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.config.provider.clone(),
        model: state.pipeline.model().to_string(),
        configured: state.pipeline.is_configured(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct ProcessQueryRequest {
    query: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

async fn process_query_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ProcessQueryRequest>,
) -> Result<Json<QueryResult>, (StatusCode, Json<ErrorResponse>)> {
    if payload.query.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "query must not be empty".into(),
            }),
        ));
    }

    info!(
        query_len = payload.query.len(),
        history = payload.history.len(),
        "Query received"
    );

    let result = state.pipeline.process(&payload.query, &payload.history).await;
    Ok(Json(result))
}
