//! Error types shared across the application
//!
//! `DataSourceError` is the only failure a menu load can surface. Record-level
//! problems (`MalformedRecord`) stay inside the repository adapters, where the
//! offending record is dropped.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure to obtain the menu from its backing data source.
#[derive(Error, Debug)]
pub enum DataSourceError {
    #[error("data source unreachable: {0}")]
    Unreachable(String),

    #[error("data source returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("data source response could not be decoded: {0}")]
    Decode(String),

    #[error("data source read failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for DataSourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DataSourceError::Decode(err.to_string())
        } else {
            DataSourceError::Unreachable(err.to_string())
        }
    }
}

/// Reason a single provider record was excluded from the menu.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedRecord {
    #[error("record {id} has no name")]
    MissingName { id: String },

    #[error("record {id} has no price")]
    MissingPrice { id: String },

    #[error("record {id} has an invalid price {price}")]
    InvalidPrice { id: String, price: f64 },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("item {0} is not on the menu")]
    UnknownMenuItem(String),

    #[error(transparent)]
    DataSource(#[from] DataSourceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::UnknownMenuItem { .. } => StatusCode::NOT_FOUND,
            AppError::DataSource { .. } => StatusCode::BAD_GATEWAY,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
