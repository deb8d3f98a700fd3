use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use kuvertki_core::CoreError;
use kuvertki_pipeline::PipelineError;

/// API-level error type. Wraps pipeline errors and adds HTTP-specific
/// variants, mapping each to a status code and a stable machine-readable
/// code.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Busy(String),

    /// The job exists but its PDF is not on disk yet (or the job id is
    /// unknown). Served as plain text to match what pollers expect.
    #[error("Файл ещё не готов")]
    FileNotReady,
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Pipeline(PipelineError::Core(CoreError::Validation(_))) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Pipeline(PipelineError::Core(CoreError::MalformedTemplate(_)))
            | AppError::Pipeline(PipelineError::MissingPart(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "MALFORMED_TEMPLATE")
            }
            AppError::Pipeline(PipelineError::TemplateMissing(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_MISSING")
            }
            AppError::Pipeline(PipelineError::ConversionFailed { .. })
            | AppError::Pipeline(PipelineError::ConversionTimeout(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "CONVERSION_FAILED")
            }
            AppError::Pipeline(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Busy(_) => (StatusCode::SERVICE_UNAVAILABLE, "BUSY"),
            AppError::FileNotReady => (StatusCode::NOT_FOUND, "FILE_NOT_READY"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if matches!(self, AppError::FileNotReady) {
            return (StatusCode::NOT_FOUND, self.to_string()).into_response();
        }

        let (status, code) = self.status_and_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
