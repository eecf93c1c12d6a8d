//! API error types and their HTTP status mapping.
//!
//! | Registry error | Status |
//! |----------------|--------|
//! | validation (hex, names, references, states, documents) | 400 |
//! | `NotFound` | 404 |
//! | `Conflict` | 409 |
//! | `StoreUnavailable` | 503 |
//!
//! Every error body has the shape `{"error": {"kind": ..., "message": ...}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use registry_core::{RegistryError, RegistryErrorKind};
use serde::{Deserialize, Serialize};

/// Error kinds raised by the HTTP layer itself rather than the registry.
pub mod kinds {
    pub const INVALID_BODY: &str = "InvalidBody";
    pub const INVALID_ID: &str = "InvalidId";
    pub const TIMEOUT: &str = "Timeout";
}

/// An error ready to be rendered as an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: String,
    pub message: String,
}

/// Serialized error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Request body could not be decoded
    pub fn invalid_body(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            kinds::INVALID_BODY,
            format!("Invalid request body: {}", details.into()),
        )
    }

    /// Record identifier in the path is not a UUID
    pub fn invalid_id(input: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            kinds::INVALID_ID,
            format!("Invalid record ID: {input}"),
        )
    }

    /// Request exceeded its deadline
    pub fn timeout(details: impl Into<String>) -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, kinds::TIMEOUT, details)
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            error: ErrorDetail {
                kind: self.kind.clone(),
                message: self.message.clone(),
            },
        }
    }
}

/// Status code for a registry error kind.
pub fn status_for(kind: RegistryErrorKind) -> StatusCode {
    match kind {
        RegistryErrorKind::MalformedHex
        | RegistryErrorKind::DuplicateName
        | RegistryErrorKind::EmptyStates
        | RegistryErrorKind::DuplicateStateHex
        | RegistryErrorKind::UnresolvedReference
        | RegistryErrorKind::MissingField
        | RegistryErrorKind::StateOutOfRange
        | RegistryErrorKind::Document => StatusCode::BAD_REQUEST,
        RegistryErrorKind::NotFound => StatusCode::NOT_FOUND,
        RegistryErrorKind::Conflict => StatusCode::CONFLICT,
        RegistryErrorKind::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let kind = err.kind();
        Self::new(status_for(kind), format!("{kind:?}"), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, kind = %self.kind, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, kind = %self.kind, "{}", self.message);
        }
        (self.status, Json(self.body())).into_response()
    }
}
