use crate::scan::{ScannerError, ServiceError};
use crate::server::templates::TemplateError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Malformed upload: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Service(ServiceError::ArchiveRejected(_)) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Service(ServiceError::ArchiveNotFound(_)) => StatusCode::BAD_REQUEST,
            AppError::Service(ServiceError::ArchiveUnsupported(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            AppError::Service(ServiceError::Scanner(ScannerError::NotFound(_))) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Service(ServiceError::Scanner(ScannerError::Timeout { .. })) => {
                StatusCode::GATEWAY_TIMEOUT
            }
            AppError::Service(_) | AppError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
