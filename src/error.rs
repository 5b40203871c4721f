//! Application error type and HTTP error responses.
//!
//! Every error that crosses the HTTP boundary is rendered as
//! `{"error": "<message>", "code": "<CODE>"}` with a status matching the
//! error class. Storage errors never leak driver details to clients.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Destination URL failed format, loop-prevention, or localhost checks.
    #[error("{0}")]
    InvalidUrl(String),

    /// Request body or query parameters failed validation.
    #[error("{0}")]
    Validation(String),

    /// No free short code found within the retry budget.
    #[error("Failed to shorten URL. Please try again.")]
    ExhaustedRetries,

    /// Short code is well-formed but maps to nothing.
    #[error("Short link not found")]
    LinkNotFound,

    /// Path segment is not a 7-character alphanumeric code.
    #[error("Invalid short code format")]
    InvalidShortCode,

    #[error("{message}")]
    Unauthorized {
        message: String,
        code: &'static str,
    },

    /// Unique constraint violation. `constraint` carries the index name so
    /// the creation flow can tell a code collision from a dedupe race.
    #[error("{message}")]
    Conflict {
        message: String,
        code: &'static str,
        constraint: Option<String>,
    },

    #[error("Storage error")]
    Store(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code: "UNAUTHORIZED",
        }
    }

    pub fn unauthorized_with_code(message: impl Into<String>, code: &'static str) -> Self {
        Self::Unauthorized {
            message: message.into(),
            code,
        }
    }

    pub fn conflict(message: impl Into<String>, code: &'static str) -> Self {
        Self::Conflict {
            message: message.into(),
            code,
            constraint: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine-readable code included in every error body.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ExhaustedRetries => "SHORTEN_FAILED",
            Self::LinkNotFound => "LINK_NOT_FOUND",
            Self::InvalidShortCode => "INVALID_SHORT_CODE",
            Self::Unauthorized { code, .. } => code,
            Self::Conflict { code, .. } => code,
            Self::Store(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::LinkNotFound | Self::InvalidShortCode => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::ExhaustedRetries | Self::Store(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        let message = match &self {
            // Driver messages can contain connection strings.
            Self::Store(e) => {
                tracing::error!(error = %e, "storage error");
                "A storage error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message, "code": code }))).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "Invalid request".to_string());

        Self::Validation(message)
    }
}

/// Maps low-level sqlx errors from mutation paths into [`AppError`].
///
/// Unique violations become [`AppError::Conflict`] carrying the constraint
/// name; everything else is a generic storage error.
pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::Conflict {
                message: "Unique constraint violation".to_string(),
                code: "CONFLICT",
                constraint: db.constraint().map(str::to_string),
            };
        }
    }

    AppError::Store(e)
}
