//! # Error Handling
//!
//! Every operation returns [`ApiError`] on failure. The error renders itself as the
//! standard response envelope:
//!
//! ```json
//! {"code": 404, "message": "no record found with id 7", "data": null}
//! ```
//!
//! Validation failures additionally carry the first message as `tips` and every
//! failing field under `errors`:
//!
//! ```json
//! {"code": 422, "message": "validate error", "tips": "title is required",
//!  "errors": {"title": "title is required"}, "data": null}
//! ```
//!
//! Database and internal errors are logged through `tracing` and replaced by a generic
//! message before they reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::validation::ValidationErrors;

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found
    NotFound {
        /// User-facing message
        message: String,
    },

    /// 400 Bad Request - malformed parameters or body
    BadRequest {
        /// User-facing message
        message: String,
    },

    /// 401 Unauthorized - the resource needs a current user
    Unauthorized {
        /// User-facing message
        message: String,
    },

    /// 403 Forbidden
    Forbidden {
        /// User-facing message
        message: String,
    },

    /// 409 Conflict - duplicate key
    Conflict {
        /// User-facing message
        message: String,
    },

    /// 422 Unprocessable Entity - rule validation failed
    ValidationFailed {
        /// Field errors, in rule order
        errors: ValidationErrors,
    },

    /// 500 Internal Server Error - database error (details logged, not exposed)
    Database {
        /// Internal error
        internal: DbErr,
    },

    /// 500 Internal Server Error
    Internal {
        /// User-facing generic message
        message: String,
        /// Internal error details (logged, not sent to user)
        internal: Option<String>,
    },

    /// Custom error with specific status code
    Custom {
        /// HTTP status code
        status: StatusCode,
        /// User-facing message
        message: String,
    },
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Not-found error for a single record lookup.
    pub fn record_not_found(id: &str) -> Self {
        Self::not_found(format!("no record found with id {id}"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation_failed(errors: ValidationErrors) -> Self {
        Self::ValidationFailed { errors }
    }

    /// Wrap a database error. The details are logged but never sent to the client.
    #[must_use]
    pub fn database(err: DbErr) -> Self {
        Self::Database { internal: err }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    pub fn custom(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Custom {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Custom { status, .. } => *status,
        }
    }

    /// User-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { message }
            | Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Forbidden { message }
            | Self::Conflict { message }
            | Self::Internal { message, .. }
            | Self::Custom { message, .. } => message.clone(),
            Self::ValidationFailed { .. } => "validate error".to_string(),
            Self::Database { .. } => "a database error occurred".to_string(),
        }
    }

    fn log_internal(&self) {
        match self {
            Self::Database { internal } => {
                tracing::error!(error = ?internal, "database error");
            }
            Self::Internal {
                internal: Some(details),
                ..
            } => {
                tracing::error!(details = %details, "internal error");
            }
            _ => {
                tracing::debug!(
                    error = %self.user_message(),
                    status = %self.status_code(),
                    "api error"
                );
            }
        }
    }
}

/// Error envelope sent to clients
#[derive(Serialize)]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tips: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Map<String, Value>>,
    data: Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log_internal();

        let status = self.status_code();
        let (tips, errors) = match &self {
            Self::ValidationFailed { errors } => (
                Some(errors.tips().unwrap_or_default().to_string()),
                Some(errors.to_map()),
            ),
            _ => (None, None),
        };
        let body = ErrorBody {
            code: status.as_u16(),
            message: self.user_message(),
            tips,
            errors,
            data: Value::Null,
        };

        (status, Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed { errors } => write!(f, "{errors}"),
            _ => write!(f, "{}", self.user_message()),
        }
    }
}

impl std::error::Error for ApiError {}

/// `RecordNotFound` becomes 404, unique-constraint violations become 409, everything
/// else is a 500 whose details are only logged.
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            return Self::not_found(msg.clone());
        }
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            tracing::debug!(detail = %detail, "unique constraint violation");
            return Self::conflict("duplicate record");
        }
        Self::database(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation_failed(errors)
    }
}
