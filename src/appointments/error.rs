use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use super::discount::DiscountRefusal;
use super::time_rules::TimeRuleViolation;
use crate::wallet::WalletError;

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("{}", .0.message())]
    InvalidSchedule(TimeRuleViolation),

    #[error("This time slot is already booked")]
    SlotTaken,

    #[error("{}", .0.message())]
    DiscountIneligible(DiscountRefusal),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error("Appointment not found")]
    NotFound,

    #[error("Patient not found")]
    PatientNotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AppointmentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppointmentError::InvalidSchedule(_)
            | AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotFound
            | AppointmentError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppointmentError::DiscountIneligible(refusal) => match refusal {
                DiscountRefusal::AlreadyUsed => StatusCode::CONFLICT,
                _ => StatusCode::BAD_REQUEST,
            },
            AppointmentError::SlotTaken | AppointmentError::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            AppointmentError::Wallet(wallet) => wallet.status_code(),
            AppointmentError::NotFound => StatusCode::NOT_FOUND,
            AppointmentError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppointmentError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // The partial unique index on (doctor_id, appointment_date)
            // is the final arbiter for slot contention.
            if db_err.is_unique_violation()
                && db_err.constraint() == Some("appointments_doctor_slot_key")
            {
                return AppointmentError::SlotTaken;
            }
        }
        AppointmentError::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppointmentError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("appointment error: {}", self);
        } else {
            tracing::warn!("appointment error: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_violations_are_bad_request() {
        let err = AppointmentError::InvalidSchedule(TimeRuleViolation::Weekend);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), TimeRuleViolation::Weekend.message());
    }

    #[test]
    fn test_slot_taken_is_conflict() {
        assert_eq!(AppointmentError::SlotTaken.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_discount_already_used_is_conflict_others_bad_request() {
        assert_eq!(
            AppointmentError::DiscountIneligible(DiscountRefusal::AlreadyUsed).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppointmentError::DiscountIneligible(DiscountRefusal::TooManyActive).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppointmentError::DiscountIneligible(DiscountRefusal::RecentPatient).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_wallet_errors_keep_their_status() {
        let err = AppointmentError::Wallet(WalletError::InsufficientBalance);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
