use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Insufficient wallet balance")]
    InsufficientBalance,

    #[error("Daily transaction limit exceeded")]
    DailyLimitExceeded,

    #[error("Monthly transaction limit exceeded")]
    MonthlyLimitExceeded,

    #[error("Transaction amount must be positive")]
    InvalidAmount,

    #[error("Wallet is inactive")]
    Inactive,

    #[error("Wallet not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl WalletError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            WalletError::InsufficientBalance
            | WalletError::DailyLimitExceeded
            | WalletError::MonthlyLimitExceeded
            | WalletError::InvalidAmount
            | WalletError::Inactive
            | WalletError::ValidationError(_) => StatusCode::BAD_REQUEST,
            WalletError::NotFound => StatusCode::NOT_FOUND,
            WalletError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for WalletError {
    fn from(err: sqlx::Error) -> Self {
        WalletError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for WalletError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("wallet error: {}", self);
        } else {
            tracing::warn!("wallet error: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funds_and_limit_errors_are_bad_request() {
        assert_eq!(
            WalletError::InsufficientBalance.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WalletError::DailyLimitExceeded.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WalletError::MonthlyLimitExceeded.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_database_errors_are_internal() {
        let err = WalletError::from(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
