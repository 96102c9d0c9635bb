//! HTTP error mapping

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use crate::analysis::AnalysisError;

/// Errors surfaced to HTTP clients as `{"error": "..."}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("missing multipart field 'file'")]
    MissingFile,
    #[error("invalid upload: {0}")]
    Upload(#[from] MultipartError),
    #[error("uploaded file is not a readable image: {0:#}")]
    InvalidImage(anyhow::Error),
    #[error("failed to store upload: {0:#}")]
    Storage(anyhow::Error),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFile | ApiError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            ApiError::Upload(e) => e.status(),
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Analysis(AnalysisError::Detector(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Analysis(AnalysisError::Generative(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            error!("Request failed ({}): {}", status, message);
        } else {
            warn!("Rejected request ({}): {}", status, message);
        }

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::GeminiError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidImage(anyhow::anyhow!("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Analysis(AnalysisError::Detector(anyhow::anyhow!("boom"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Analysis(AnalysisError::Generative(GeminiError::EmptyResponse)).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_generative_message_is_passed_through() {
        let err = ApiError::Analysis(AnalysisError::Generative(GeminiError::Status {
            status: 429,
            body: "quota".to_string(),
        }));
        assert_eq!(err.to_string(), "Gemini API returned 429: quota");
    }
}
