use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("{0}")]
    Validation(String),

    #[error("No text detected in the image")]
    NoTextDetected,

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("Image processing error: {0}")]
    Image(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for KioskError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            KioskError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KioskError::NoTextDetected => (StatusCode::BAD_REQUEST, self.to_string()),
            KioskError::Image(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            KioskError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            KioskError::UrlParse(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            KioskError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            KioskError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            KioskError::Extraction(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            KioskError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            KioskError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<image::ImageError> for KioskError {
    fn from(err: image::ImageError) -> Self {
        KioskError::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;
