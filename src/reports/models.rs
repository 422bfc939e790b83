use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PatientReport {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub consultation_date: DateTime<Utc>,
    pub symptoms: String,
    pub diagnosis: String,
    pub treatment_plan: String,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateReportRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub consultation_date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 2000, message = "Symptoms must be 1-2000 characters"))]
    pub symptoms: String,
    #[validate(length(min = 1, max = 2000, message = "Diagnosis must be 1-2000 characters"))]
    pub diagnosis: String,
    #[validate(length(min = 1, max = 2000, message = "Treatment plan must be 1-2000 characters"))]
    pub treatment_plan: String,
    pub follow_up_date: Option<DateTime<Utc>>,
}

/// Aggregated earnings for one doctor, computed from paid appointments
#[derive(Debug, Serialize, FromRow)]
pub struct EarningsSummary {
    pub doctor_id: Uuid,
    pub paid_appointments: i64,
    pub total_earnings: Decimal,
}
