//! Error types for Maklar.
//!
//! This module provides the [`ErrorCategory`] taxonomy shared by every
//! validation stage and the [`AppError`] type that request-level failures are
//! reported through.
//!
//! # Error Envelope Format
//!
//! ```json
//! {
//!   "error": {
//!     "message": "Valideringsfel",
//!     "code": "VALIDATION_ERROR",
//!     "statusCode": 400,
//!     "requestId": "0190f7c2-...",
//!     "timestamp": "2024-06-01T12:00:00Z"
//!   },
//!   "errors": [{ "field": "postnummer", "message": "...", "code": "..." }]
//! }
//! ```

use crate::{RequestId, ValidationError};
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`AppError`].
pub type AppResult<T> = Result<T, AppError>;

/// Message used for validation failures in the envelope.
pub const VALIDATION_ERROR_MESSAGE: &str = "Valideringsfel";

/// Message used for unexpected failures in the envelope.
pub const INTERNAL_ERROR_MESSAGE: &str = "Ett oväntat fel uppstod";

/// Classification of a validation failure.
///
/// Every category except [`ErrorCategory::System`] is recoverable: it is
/// reported back to the caller as a list of [`ValidationError`] entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Missing required field or wrong type.
    Structural,
    /// Malformed value (email, UUID, postal code, identifier checksum).
    Format,
    /// Numeric or length bound violated.
    Range,
    /// Multi-field business rule violated.
    CrossField,
    /// Field not declared by a strict schema.
    UnknownField,
    /// Unexpected internal failure.
    System,
}

impl ErrorCategory {
    /// Returns `true` if failures of this category are reported field by field.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::System)
    }

    /// Returns the default HTTP status code for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::System => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Request-level error.
///
/// # Example
///
/// ```
/// use maklar_core::{AppError, RequestId, ValidationError};
///
/// let error = AppError::validation(vec![ValidationError::new(
///     "page",
///     "Obligatoriskt fält",
///     "required",
/// )]);
/// assert_eq!(error.status_code().as_u16(), 400);
///
/// let envelope = error.to_envelope(RequestId::new(), false);
/// assert_eq!(envelope.error.code, "VALIDATION_ERROR");
/// assert_eq!(envelope.errors.as_ref().map(Vec::len), Some(1));
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more recoverable validation failures.
    #[error("{message}")]
    Validation {
        /// Human-readable summary.
        message: String,
        /// Itemized, field-addressable errors.
        errors: Vec<ValidationError>,
    },

    /// The request could not be interpreted at all (unreadable body, bad encoding).
    #[error("Bad request: {message}")]
    BadRequest {
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl AppError {
    /// Creates a validation error with the standard summary message.
    #[must_use]
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self::Validation {
            message: VALIDATION_ERROR_MESSAGE.to_string(),
            errors,
        }
    }

    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::BadRequest { .. } => ErrorCategory::Structural,
            Self::Internal { .. } => ErrorCategory::System,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns the machine-readable envelope code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::BadRequest { .. } => "BAD_REQUEST",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Converts this error into the response envelope.
    ///
    /// Internal errors always carry the generic message; their detail is only
    /// attached as `cause` when `expose_internal` is set.
    #[must_use]
    pub fn to_envelope(&self, request_id: RequestId, expose_internal: bool) -> ErrorEnvelope {
        let (message, errors, cause) = match self {
            Self::Validation { message, errors } => (message.clone(), Some(errors.clone()), None),
            Self::BadRequest { message } => (message.clone(), None, None),
            Self::Internal { message, source } => {
                let cause = expose_internal.then(|| match source {
                    Some(source) => format!("{message}: {source:#}"),
                    None => message.clone(),
                });
                (INTERNAL_ERROR_MESSAGE.to_string(), None, cause)
            }
        };

        ErrorEnvelope {
            error: ErrorBody {
                message,
                code: self.code().to_string(),
                status_code: self.status_code().as_u16(),
                request_id,
                timestamp: Utc::now(),
                cause,
            },
            errors,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error summary.
    pub error: ErrorBody,
    /// Itemized validation errors, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
}

/// Error summary within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code.
    pub code: String,
    /// HTTP status code.
    pub status_code: u16,
    /// Correlation identifier.
    pub request_id: RequestId,
    /// When the error was produced.
    pub timestamp: DateTime<Utc>,
    /// Internal detail, development only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let error = AppError::validation(vec![]);
        assert_eq!(error.category(), ErrorCategory::Structural);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.to_string(), VALIDATION_ERROR_MESSAGE);
    }

    #[test]
    fn test_internal_error_hides_detail_by_default() {
        let error = AppError::internal_with_source(
            "catalog load failed",
            anyhow::anyhow!("disk on fire"),
        );
        let envelope = error.to_envelope(RequestId::new(), false);

        assert_eq!(envelope.error.status_code, 500);
        assert_eq!(envelope.error.code, "INTERNAL_SERVER_ERROR");
        assert_eq!(envelope.error.message, INTERNAL_ERROR_MESSAGE);
        assert!(envelope.error.cause.is_none());
        assert!(envelope.errors.is_none());
    }

    #[test]
    fn test_internal_error_exposes_detail_in_development() {
        let error = AppError::internal_with_source(
            "catalog load failed",
            anyhow::anyhow!("disk on fire"),
        );
        let envelope = error.to_envelope(RequestId::new(), true);

        let cause = envelope.error.cause.unwrap();
        assert!(cause.contains("catalog load failed"));
        assert!(cause.contains("disk on fire"));
    }

    #[test]
    fn test_envelope_serialization() {
        let request_id = RequestId::new();
        let error = AppError::validation(vec![ValidationError::new("page", "m", "required")]);
        let json = serde_json::to_value(error.to_envelope(request_id, false)).unwrap();

        assert_eq!(json["error"]["statusCode"], 400);
        assert_eq!(json["error"]["requestId"], request_id.to_string());
        assert_eq!(json["error"]["message"], "Valideringsfel");
        assert!(json["error"]["timestamp"].is_string());
        assert!(json["error"].get("cause").is_none());
        assert_eq!(json["errors"][0]["field"], "page");
    }

    #[test]
    fn test_bad_request_has_no_item_list() {
        let envelope = AppError::bad_request("unreadable body").to_envelope(RequestId::new(), false);
        assert_eq!(envelope.error.code, "BAD_REQUEST");
        assert!(envelope.errors.is_none());
    }

    #[test]
    fn test_only_system_is_unrecoverable() {
        let categories = [
            ErrorCategory::Structural,
            ErrorCategory::Format,
            ErrorCategory::Range,
            ErrorCategory::CrossField,
            ErrorCategory::UnknownField,
        ];
        for category in categories {
            assert!(category.is_recoverable(), "{category:?}");
            assert_eq!(category.default_status_code(), StatusCode::BAD_REQUEST);
        }
        assert!(!ErrorCategory::System.is_recoverable());
    }

    #[test]
    fn test_category_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCategory::CrossField).unwrap();
        assert_eq!(json, "\"CROSS_FIELD\"");
    }
}
