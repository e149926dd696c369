use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::jobs::extractor::ExtractionError;
use crate::jobs::fetch::FetchError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::DescriptionNotFound => AppError::NotFound(
                "Could not find a job description on that page. \
                 Please copy and paste the job description manually."
                    .to_string(),
            ),
        }
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Timeout { secs } => AppError::Timeout(format!(
                "Fetching the job page took longer than {secs} seconds"
            )),
            FetchError::HostNotAllowed(_) => AppError::Validation(err.to_string()),
            FetchError::Status(404) => {
                AppError::NotFound("Job posting not found at that URL".to_string())
            }
            other => AppError::Upstream(other.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge("Upload exceeds the request size limit".to_string());
        }
        AppError::Validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Timeout(msg) => {
                tracing::warn!("Request timed out: {msg}");
                (StatusCode::REQUEST_TIMEOUT, "REQUEST_TIMEOUT", msg.clone())
            }
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::UnsupportedMediaType(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                msg.clone(),
            ),
            AppError::Upstream(msg) => {
                tracing::warn!("Upstream error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Failed to fetch the job page".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_failure_maps_to_not_found() {
        let err = AppError::from(ExtractionError::DescriptionNotFound);
        assert!(matches!(&err, AppError::NotFound(msg) if msg.contains("manually")));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_fetch_timeout_maps_to_request_timeout() {
        let err = AppError::from(FetchError::Timeout { secs: 10 });
        assert_eq!(err.into_response().status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_fetch_status_mapping() {
        let missing = AppError::from(FetchError::Status(404));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let forbidden = AppError::from(FetchError::Status(403));
        assert_eq!(forbidden.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_fetch_guard_mapping() {
        let host = AppError::from(FetchError::HostNotAllowed("10.0.0.1".to_string()));
        assert!(matches!(&host, AppError::Validation(msg) if msg.contains("10.0.0.1")));

        let oversized = AppError::from(FetchError::TooLarge { limit_bytes: 1024 });
        assert_eq!(oversized.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_llm_error_hides_details() {
        let response = AppError::Llm("secret upstream body".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
