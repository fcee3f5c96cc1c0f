use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use recommender::engine::EngineError;

use crate::gateway::{STATUS_ERROR, STATUS_HEADER, STATUS_NOT_READY};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("service not ready: {0}")]
    NotReady(String),

    #[error("recommendation failed: {0}")]
    RecommendationFailed(#[from] EngineError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, status_header) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::NotReady(_) => (StatusCode::SERVICE_UNAVAILABLE, STATUS_NOT_READY),
            GatewayError::RecommendationFailed(EngineError::InvalidInput { .. }) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            GatewayError::RecommendationFailed(_) | GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, STATUS_ERROR)
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(status_header));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
