//! HTTP gateway (Axum) for recommendations.
//!
//! Routes:
//! - `GET /health`: liveness, always 200
//! - `GET /ready`: 200 once the engine is published, 503 while loading or after a failed build
//! - `POST /recommend`: `{query}` to `{recommended_assessments}`

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use handler::recommend_handler;
pub use state::{EngineStatus, HandlerState};

use recommender::embedding::EmbeddingProvider;

pub const STATUS_HEADER: &str = "x-recommender-status";
pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";
pub const STATUS_NOT_READY: &str = "not_ready";
pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

pub fn create_router_with_state<E>(state: HandlerState<E>) -> Router
where
    E: EmbeddingProvider + 'static,
{
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler::<E>))
        .route("/recommend", post(recommend_handler::<E>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Allows the configured origins with credentials; request headers are mirrored back.
///
/// Origins that are not valid header values are skipped with a warning. A trailing `/` is
/// dropped because browsers never send one in `Origin`.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            let origin = origin.trim().trim_end_matches('/');
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin, "Skipping invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedder_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_HEALTHY));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: STATUS_HEALTHY.to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<E>(State(state): State<HandlerState<E>>) -> Response
where
    E: EmbeddingProvider + 'static,
{
    let status = state.status();

    let (status_code, header, body) = match &status {
        EngineStatus::Ready(engine) => {
            let embedder_mode = engine.embedder().mode();
            (
                StatusCode::OK,
                STATUS_READY,
                ReadyResponse {
                    status: status.label().to_string(),
                    catalog_rows: Some(engine.len()),
                    embedder_mode: Some(embedder_mode),
                    error: None,
                },
            )
        }
        EngineStatus::Loading => (
            StatusCode::SERVICE_UNAVAILABLE,
            STATUS_NOT_READY,
            ReadyResponse {
                status: status.label().to_string(),
                catalog_rows: None,
                embedder_mode: None,
                error: None,
            },
        ),
        EngineStatus::Failed(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            STATUS_NOT_READY,
            ReadyResponse {
                status: status.label().to_string(),
                catalog_rows: None,
                embedder_mode: None,
                error: Some(reason.clone()),
            },
        ),
    };

    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(header));

    (status_code, headers, Json(body)).into_response()
}
