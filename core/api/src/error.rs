// cobuy/core/api/src/error.rs

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use cobuy_recommender::RecommendError;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

/// Error response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Errors returned by API handlers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body rejected by the JSON extractor (syntax, shape, size or content type)
    #[error("{message}")]
    InvalidPayload { status: StatusCode, message: String },

    #[error("Too many order items: {count} (max: {max})")]
    TooManyItems { count: usize, max: usize },

    #[error("Recommendation failed: {0}")]
    Recommend(#[from] RecommendError),

    #[error("Recommendation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload { status, .. } => *status,
            ApiError::TooManyItems { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Recommend(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "internal error".to_string()
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
