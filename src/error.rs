// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::middleware::request_id::current_request_id;

/// HTTP API error with a stable machine-readable code and a client-safe message
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    AlreadyExists(String),
    AlreadyMember(String),
    PendingRequestExists(String),

    // 500 Internal Server Error. `detail` is logged, never returned.
    Internal {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::AlreadyExists(_) => 409,
            ApiError::AlreadyMember(_) => 409,
            ApiError::PendingRequestExists(_) => 409,
            ApiError::Internal { .. } => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::AlreadyExists(msg) => msg,
            ApiError::AlreadyMember(msg) => msg,
            ApiError::PendingRequestExists(msg) => msg,
            ApiError::Internal { message, .. } => message,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::AlreadyExists(_) => "ALREADY_EXISTS",
            ApiError::AlreadyMember(_) => "ALREADY_MEMBER",
            ApiError::PendingRequestExists(_) => "PENDING_REQUEST_EXISTS",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Convert to the `error` object of the response envelope
    pub fn to_json(&self) -> Value {
        let mut error = json!({
            "code": self.error_code(),
            "message": self.message(),
        });

        if let ApiError::Validation {
            field_errors: Some(field_errors),
            ..
        } = self
        {
            error["fields"] = json!(field_errors);
        }

        error
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::validation_error(message, None)
    }

    /// Validation failure pinned to a single request field
    pub fn invalid_field(field: impl Into<String>, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.into(), problem.into());
        Self::validation_error("Invalid request body", Some(field_errors))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        ApiError::AlreadyExists(message.into())
    }

    pub fn already_member(message: impl Into<String>) -> Self {
        ApiError::AlreadyMember(message.into())
    }

    pub fn pending_request_exists(message: impl Into<String>) -> Self {
        ApiError::PendingRequestExists(message.into())
    }

    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        ApiError::Internal {
            message: message.into(),
            detail: Some(detail.to_string()),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
            detail: None,
        }
    }
}

// Convert other error types to ApiError
impl From<crate::database::DatabaseError> for ApiError {
    fn from(err: crate::database::DatabaseError) -> Self {
        use crate::database::DatabaseError;

        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::UniqueViolation(constraint) => {
                tracing::debug!(constraint = %constraint, "unique constraint violated");
                ApiError::already_exists("Resource already exists")
            }
            DatabaseError::NotPending => ApiError::validation("Join request has already been processed"),
            other => ApiError::internal("An error occurred while processing your request", other),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let request_id = current_request_id();

        if let ApiError::Internal {
            message,
            detail: Some(detail),
        } = &self
        {
            tracing::error!(request_id = %request_id, detail = %detail, "{}", message);
        }

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = json!({
            "error": self.to_json(),
            "requestId": request_id,
        });

        (status, Json(body)).into_response()
    }
}
