//! API error taxonomy
//!
//! Every failure a handler can report is one [`ApiError`] variant. The
//! response is the JSON envelope `{status, error, message, path}`; `path` is
//! filled in by [`crate::api::middleware::error_envelope`], which knows the
//! original request path.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::services::{MovieServiceError, ShowtimeServiceError};

/// Message returned for every internal failure; details only go to the log
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug)]
pub enum ApiError {
    /// The addressed entity does not exist
    NotFound(String),
    /// Declared constraints were violated, field -> message
    ValidationFailed(BTreeMap<String, String>),
    /// Request parameters could not be bound, field -> message
    InvalidParameters(BTreeMap<String, String>),
    /// A parameter value could not be converted to its declared type
    InvalidParameterType {
        value: String,
        name: String,
        expected: &'static str,
    },
    /// Anything else; never shown to the client
    Internal(anyhow::Error),
}

/// Error body sent to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameters(BTreeMap::from([(name.into(), message.into())]))
    }

    pub fn invalid_type(value: impl Into<String>, name: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidParameterType {
            value: value.into(),
            name: name.into(),
            expected,
        }
    }

    pub fn internal(error: impl Into<anyhow::Error>) -> Self {
        Self::Internal(error.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) | Self::InvalidParameters(_) | Self::InvalidParameterType { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Category label carried in the `error` field
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Not Found",
            Self::ValidationFailed(_) => "Validation Failed",
            Self::InvalidParameters(_) => "Invalid Parameters",
            Self::InvalidParameterType { .. } => "Invalid Parameter Type",
            Self::Internal(_) => "Internal Server Error",
        }
    }

    /// Client-facing message
    pub fn message(&self) -> String {
        match self {
            Self::NotFound(message) => message.clone(),
            Self::ValidationFailed(fields) | Self::InvalidParameters(fields) => {
                format!("Invalid request parameters: {}", render_fields(fields))
            }
            Self::InvalidParameterType { value, name, expected } => format!(
                "Invalid value '{}' for parameter '{}'. Expected type: {}",
                value, name, expected
            ),
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Envelope for this error; `path` is left empty
    pub fn to_body(&self) -> ErrorResponse {
        ErrorResponse {
            status: self.status().as_u16(),
            error: self.label().to_string(),
            message: self.message(),
            path: String::new(),
        }
    }
}

/// `{a=x, b=y}`, keys in ascending order
fn render_fields(fields: &BTreeMap<String, String>) -> String {
    let pairs: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{{{}}}", pairs.join(", "))
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationFailed(crate::models::validation::field_violations(&errors))
    }
}

impl From<MovieServiceError> for ApiError {
    fn from(err: MovieServiceError) -> Self {
        match err {
            MovieServiceError::NotFound(_) => Self::NotFound(err.to_string()),
            MovieServiceError::Mapping(e) => Self::internal(e),
            MovieServiceError::InternalError(e) => Self::Internal(e),
        }
    }
}

impl From<ShowtimeServiceError> for ApiError {
    fn from(err: ShowtimeServiceError) -> Self {
        match err {
            ShowtimeServiceError::Mapping(e) => Self::internal(e),
            ShowtimeServiceError::InternalError(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Internal(e) => tracing::error!(error = ?e, "Unexpected error"),
            _ => tracing::warn!("{}: {}", self.label(), self.message()),
        }

        let body = self.to_body();
        let mut response = (self.status(), Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}
