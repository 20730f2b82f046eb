//! API error type with structured JSON bodies.

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use sanad::{LibraryError, PipelineError, ProcessError, ProgressError};

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Upload rejected: {0}")]
    UploadRejected(String),
    #[error("File too large: {0}")]
    FileTooLarge(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("Page out of range: {0}")]
    PageOutOfRange(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("File not readable: {0}")]
    FileNotReadable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail),
            ApiError::UploadRejected(detail) => {
                (StatusCode::BAD_REQUEST, "UPLOAD_REJECTED", detail)
            }
            ApiError::FileTooLarge(detail) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE", detail)
            }
            ApiError::PermissionDenied(detail) => {
                (StatusCode::FORBIDDEN, "PERMISSION_DENIED", detail)
            }
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail),
            ApiError::TaskNotFound(detail) => (StatusCode::NOT_FOUND, "TASK_NOT_FOUND", detail),
            ApiError::PageOutOfRange(detail) => {
                (StatusCode::BAD_REQUEST, "PAGE_OUT_OF_RANGE", detail)
            }
            ApiError::UnsupportedFormat(detail) => {
                (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT", detail)
            }
            ApiError::FileNotReadable(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "FILE_NOT_READABLE",
                detail,
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<LibraryError> for ApiError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::UploadRejected(msg) => ApiError::UploadRejected(msg),
            e @ LibraryError::FileTooLarge { .. } => ApiError::FileTooLarge(e.to_string()),
            e @ LibraryError::NotFound(_) => ApiError::NotFound(e.to_string()),
            LibraryError::PermissionDenied(msg) => ApiError::PermissionDenied(msg),
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ProcessError> for ApiError {
    fn from(err: ProcessError) -> Self {
        match err {
            e @ ProcessError::PageOutOfRange { .. } => ApiError::PageOutOfRange(e.to_string()),
            e @ ProcessError::UnsupportedFormat(_) => ApiError::UnsupportedFormat(e.to_string()),
            e if e.is_file_not_readable() => {
                tracing::warn!(error = %e, "document not readable");
                ApiError::FileNotReadable(e.public_message())
            }
            e => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Processing(e) => e.into(),
            e @ PipelineError::FileTooLarge { .. } => ApiError::FileTooLarge(e.to_string()),
            e @ PipelineError::Interrupted(_) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ProgressError> for ApiError {
    fn from(err: ProgressError) -> Self {
        ApiError::TaskNotFound(err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::BadRequest(format!("Malformed upload: {}", err.body_text()))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("worker task failed: {err}"))
    }
}
