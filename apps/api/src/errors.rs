use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// The `Display` text is exactly what the client receives in the `error` field.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Nema datoteke")]
    MissingFile,

    #[error("Nema odabrane datoteke")]
    NoFileSelected,

    #[error("Neispravan zahtjev: {0}")]
    MalformedUpload(String),

    #[error("Datoteka je prevelika. Maksimalna veličina je 50MB.")]
    PayloadTooLarge,

    #[error("Greška pri izvlačenju: {0}")]
    Extraction(String),

    #[error("Nepredviđena greška: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::NoFileSelected | AppError::MalformedUpload(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Extraction(_) | AppError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::MalformedUpload(err.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Extraction(msg) => tracing::warn!("Extraction failed: {msg}"),
            AppError::Unexpected(e) => tracing::error!("Internal error: {e:?}"),
            _ => {}
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_400() {
        assert_eq!(AppError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NoFileSelected.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_extraction_message_is_prefixed() {
        let err = AppError::Extraction("timeout".to_string());
        assert_eq!(err.to_string(), "Greška pri izvlačenju: timeout");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_unexpected_includes_context_chain() {
        let source = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = AppError::from(anyhow::Error::new(source).context("Failed to stage upload"));
        let message = err.to_string();
        assert!(message.starts_with("Nepredviđena greška: Failed to stage upload"));
        assert!(message.contains("disk full"));
    }
}
