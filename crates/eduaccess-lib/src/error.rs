//! Boundary error type. Every handler failure becomes `{ "error": ... }`
//! with 400 for caller mistakes and 500 for everything else.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use eduaccess_core::types::ErrorResponse;

use crate::config::ConfigError;
use crate::extract::ExtractError;
use crate::media::MediaError;
use crate::speech::SpeechError;
use crate::vision::VisionError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Speech(SpeechError),
    #[error(transparent)]
    Vision(VisionError),
    #[error(transparent)]
    Extraction(#[from] ExtractError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("audio file not found: {0}")]
    AudioNotFound(String),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Configuration problems surface as `Config` no matter which client hit them.
impl From<SpeechError> for ApiError {
    fn from(e: SpeechError) -> Self {
        match e {
            SpeechError::Config(c) => Self::Config(c),
            other => Self::Speech(other),
        }
    }
}

impl From<VisionError> for ApiError {
    fn from(e: VisionError) -> Self {
        match e {
            VisionError::Config(c) => Self::Config(c),
            other => Self::Vision(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "request rejected");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
