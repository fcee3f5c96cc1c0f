use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use recommender::embedding::EmbeddingProvider;
use recommender::engine::{self, AssessmentRecord};

use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::gateway::{STATUS_HEADER, STATUS_OK};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// Free-text query or job description.
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub recommended_assessments: Vec<AssessmentRecord>,
}

/// Trims and rejects blank queries.
pub fn validate_query(query: &str) -> Result<&str, GatewayError> {
    Ok(engine::validate_query(query)?)
}

#[instrument(skip(state, request), fields(query_len = tracing::field::Empty))]
pub async fn recommend_handler<E>(
    State(state): State<HandlerState<E>>,
    request: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    E: EmbeddingProvider + 'static,
{
    let Json(request) =
        request.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let query = validate_query(&request.query)?.to_string();
    tracing::Span::current().record("query_len", query.len());

    let engine = state.ready_engine()?;
    let top_k = state.top_k;

    let records = tokio::task::spawn_blocking(move || engine.recommend(&query, top_k))
        .await
        .map_err(|e| GatewayError::InternalError(format!("recommendation task failed: {e}")))??;

    debug!(returned = records.len(), "Recommendation served");

    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_OK));

    Ok((
        StatusCode::OK,
        headers,
        Json(RecommendResponse {
            recommended_assessments: records,
        }),
    )
        .into_response())
}
