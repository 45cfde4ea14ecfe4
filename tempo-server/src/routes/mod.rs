pub mod availability;
pub mod events;
pub mod recurring;
pub mod stats;
pub mod wake;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use tempo_core::EngineError;

/// Response envelope shared by every endpoint:
/// `{status: "ok"|"error", data?, message?}`.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Success envelope around a payload.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        status: "ok",
        data: Some(data),
        message: None,
    })
}

/// Success envelope with no payload (deletes).
pub fn ok_empty() -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        status: "ok",
        data: None,
        message: None,
    })
}

/// Convert engine errors to HTTP responses.
pub struct ApiError(pub EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::InvalidPattern(_)
            | EngineError::InvalidEvent(_)
            | EngineError::WindowOutOfRange { .. }
            | EngineError::InvalidTimestamp(_)
            | EngineError::InvalidDate(_) => StatusCode::BAD_REQUEST,
        };
        let body = Json(ApiResponse::<()> {
            status: "error",
            data: None,
            message: Some(self.0.to_string()),
        });
        (status, body).into_response()
    }
}
