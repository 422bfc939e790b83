use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Scheduled
    }
}

/// Which party cancelled an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CancelledBy {
    Patient,
    Doctor,
}

impl CancelledBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            CancelledBy::Patient => "patient",
            CancelledBy::Doctor => "doctor",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub discount_used: bool,
    pub fees_amount: Decimal,
    pub fees_paid: bool,
    pub fees_paid_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
    pub cancelled_by: Option<CancelledBy>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values for a new appointment row; the id is generated by the
/// caller so the wallet debit recorded in the same transaction can
/// reference it.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub appointment_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub discount_used: bool,
    pub fees_amount: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// RFC 3339 timestamp of the requested slot
    pub appointment_date: String,
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
    #[serde(default)]
    pub discount_used: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CancelAppointmentRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
    pub cancelled_by: CancelledBy,
}

/// Filters for listing appointments
#[derive(Debug, Default, Deserialize)]
pub struct AppointmentQuery {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    /// When true, only appointments from now onward
    pub upcoming: Option<bool>,
}

/// Booking result returned to the client; the debit reference is present
/// only when a discount was taken.
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub appointment: Appointment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_reference: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(AppointmentStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(AppointmentStatus::from_str("rescheduled"), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Scheduled).unwrap();
        assert_eq!(json, "\"scheduled\"");
    }

    #[test]
    fn test_discount_used_defaults_to_false() {
        let request: BookAppointmentRequest = serde_json::from_value(serde_json::json!({
            "patient_id": Uuid::new_v4(),
            "doctor_id": Uuid::new_v4(),
            "appointment_date": "2025-06-03T10:00:00Z",
        }))
        .unwrap();
        assert!(!request.discount_used);
    }
}
