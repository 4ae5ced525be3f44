//! Errors returned by the HTTP handlers.
//!
//! Every variant renders as `{"error": "<message>"}` with a status code that
//! tells the caller whose fault it was.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::core::bookings::BookingStoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request body or parameters are invalid
    #[error("{0}")]
    BadRequest(String),

    /// A hosted collaborator failed or answered with garbage
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// The server has no API key for the hosted model API
    #[error("API key not configured")]
    MissingApiKey,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MissingApiKey => StatusCode::SERVICE_UNAVAILABLE,
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

impl From<BookingStoreError> for AppError {
    fn from(err: BookingStoreError) -> Self {
        match err {
            BookingStoreError::Validation(message) => Self::BadRequest(message),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // A request that could not be built never left this process
        if err.is_builder() {
            Self::Internal(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}
