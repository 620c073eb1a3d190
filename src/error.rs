//! Application error taxonomy and its HTTP mapping.
//!
//! Repositories and services speak [`AppError`] only; raw `sqlx` errors are
//! classified at the boundary by [`From<sqlx::Error>`].

use std::collections::BTreeMap;

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use validator::ValidationErrors;

use crate::utils::db_error::is_unique_violation_on_code;

/// Per-field validation messages, keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Serializable error payload returned in API responses.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    Unauthorized { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Builds a validation error from a field → messages map.
    pub fn invalid_fields(field_errors: FieldErrors) -> Self {
        Self::bad_request("Invalid input", json!({ "field_errors": field_errors }))
    }

    /// Returns the per-field messages when this is a field-level validation error.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            Self::Validation { details, .. } => details
                .get("field_errors")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converts the error into its client-facing payload.
    ///
    /// Internal errors are reduced to a generic message; their details stay in the logs.
    pub fn to_error_info(&self) -> ErrorInfo {
        match self {
            Self::Validation { message, details } => ErrorInfo {
                code: "validation_error",
                message: message.clone(),
                details: details.clone(),
            },
            Self::Unauthorized { message, details } => ErrorInfo {
                code: "unauthorized",
                message: message.clone(),
                details: details.clone(),
            },
            Self::NotFound { message, details } => ErrorInfo {
                code: "not_found",
                message: message.clone(),
                details: details.clone(),
            },
            Self::Conflict { message, details } => ErrorInfo {
                code: "conflict",
                message: message.clone(),
                details: details.clone(),
            },
            Self::Internal { .. } => ErrorInfo {
                code: "internal_error",
                message: "Something went wrong. Please try again.".to_string(),
                details: json!({}),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal { message, details } = &self {
            tracing::error!(%message, %details, "Request failed with internal error");
        }

        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_error_info(),
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation_on_code(&e) {
            return AppError::conflict(
                "This short code is already taken. Please choose another one.",
                json!({ "field": "short_code" }),
            );
        }

        AppError::internal("Database error", json!({ "reason": e.to_string() }))
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors: FieldErrors = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let messages = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();

        AppError::invalid_fields(field_errors)
    }
}
