//! Error types for the CardVault server

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Data access failure: {0}")]
    DataAccess(String),

    #[error("Query timed out after {0:?}")]
    QueryTimeout(Duration),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Data-access failures are transient from the caller's point of view.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Database(_) | Error::DataAccess(_) | Error::QueryTimeout(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            Error::Validation(_) => (StatusCode::BAD_REQUEST, "invalid", self.to_string()),
            Error::Database(_) | Error::DataAccess(_) | Error::QueryTimeout(_) => {
                tracing::error!(error = %self, "Data access failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "unavailable",
                    "Search is temporarily unavailable, please retry".to_string(),
                )
            }
            Error::Config(_) | Error::Internal(_) | Error::Other(_) => {
                tracing::error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "exception",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message,
                "retryable": self.is_retryable(),
            }
        }));

        let mut response = (status, body).into_response();

        if self.is_retryable() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from_static("1"));
        }

        response
    }
}
