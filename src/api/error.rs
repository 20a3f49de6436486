//! HTTP error mapping
//!
//! Every error body is `{"error": "<message>"}`. Storage failures are logged
//! and replaced by a generic message.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{InquiryError, StoreError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    Service(InquiryError),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Misconfigured,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Service(err) => match err {
                InquiryError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                InquiryError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "Inquiry not found".to_string())
                }
                InquiryError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
                InquiryError::Config(e) => {
                    tracing::error!("Configuration error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server misconfiguration".to_string(),
                    )
                }
                InquiryError::Storage(e) => {
                    tracing::error!("Storage error: {}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Forbidden - Invalid token".to_string(),
            ),
            ApiError::Misconfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server misconfiguration".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<InquiryError> for ApiError {
    fn from(err: InquiryError) -> Self {
        ApiError::Service(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Service(InquiryError::Storage(err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
