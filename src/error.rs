// Error handling module for the Clinic API
// Provides centralized error types and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};

/// Main error type for the generic CRUD surface
/// Handlers without a domain-specific error enum return Result<T, ApiError>
///
/// Each variant maps to a specific HTTP status code and error response format.
#[derive(Debug)]
pub enum ApiError {
    /// Validation errors from request validation
    /// Maps to HTTP 400 Bad Request
    ValidationError(validator::ValidationErrors),

    /// Resource not found by ID
    /// Maps to HTTP 404 Not Found
    NotFound { resource: String, id: String },

    /// Duplicate resource conflict
    /// Maps to HTTP 409 Conflict
    Conflict { message: String },

    /// Database operation errors
    /// Maps to HTTP 500 Internal Server Error
    /// Sensitive details are filtered from client responses
    DatabaseError(sqlx::Error),

    /// Internal server errors
    /// Maps to HTTP 500 Internal Server Error
    InternalError(String),
}

/// Consistent error response structure
///
/// JSON format shared by all error types: a machine-readable `error_code`,
/// a human-readable `message`, optional field-level `details`, and an
/// ISO 8601 timestamp.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_code: &str, message: String) -> Self {
        Self {
            error_code: error_code.to_string(),
            message,
            details: None,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

impl ApiError {
    /// Convert ApiError to HTTP status code and ErrorResponse
    ///
    /// Logging levels follow severity: error! for store failures, warn! for
    /// conflicts, debug! for expected client errors. Database details are
    /// never exposed to clients.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);

                let mut response =
                    ErrorResponse::new("VALIDATION_ERROR", "Request validation failed".to_string());
                response.details =
                    Some(serde_json::to_value(errors).unwrap_or(serde_json::json!({})));
                (StatusCode::BAD_REQUEST, response)
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);

                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("NOT_FOUND", format!("{} with id {} not found", resource, id)),
                )
            }
            ApiError::Conflict { message } => {
                warn!("Conflict error: {}", message);

                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("CONFLICT", message.clone()),
                )
            }
            ApiError::DatabaseError(db_error) => {
                error!("Database error: {:?}", db_error);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("DATABASE_ERROR", "A database error occurred".to_string()),
                )
            }
            ApiError::InternalError(internal_msg) => {
                error!("Internal error: {}", internal_msg);

                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "INTERNAL_ERROR",
                        "An internal server error occurred".to_string(),
                    ),
                )
            }
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert sqlx errors to ApiError
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error)
    }
}

/// Convert validator errors to ApiError
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ApiError::NotFound {
            resource: "Doctor".to_string(),
            id: "abc".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_maps_to_409() {
        let err = ApiError::Conflict {
            message: "Email already exists".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_database_error_message_is_generic() {
        let err = ApiError::DatabaseError(sqlx::Error::PoolClosed);
        let (status, response) = err.to_error_response();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.message, "A database error occurred");
        assert!(response.details.is_none());
    }
}
