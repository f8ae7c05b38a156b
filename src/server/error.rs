//! Error types for the server

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::error::ClassifierError;

/// Message returned when a prediction request carries no `image` field
pub const NO_IMAGE_MESSAGE: &str = "No image provided";

#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed or oversized multipart body, with the status axum assigns it
    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

impl ServerError {
    pub fn no_image() -> Self {
        ServerError::Classifier(ClassifierError::Validation(NO_IMAGE_MESSAGE.to_string()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Multipart { status, .. } => *status,
            ServerError::Classifier(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), detail = %message, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), detail = %message, "Request rejected");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        ServerError::Multipart {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_by_kind() {
        assert_eq!(ServerError::no_image().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ServerError::from(ClassifierError::ImageDecode("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::from(ClassifierError::Inference("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let oversized = ServerError::Multipart {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "body too large".into(),
        };
        assert_eq!(oversized.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(oversized.to_string(), "body too large");
    }

    #[test]
    fn test_message_passed_through() {
        assert_eq!(ServerError::no_image().to_string(), NO_IMAGE_MESSAGE);
        let err = ServerError::from(ClassifierError::Inference("boom".into()));
        assert_eq!(err.to_string(), "Inference error: boom");
    }
}
