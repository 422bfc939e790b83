use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthTokens;

#[derive(Debug, Clone, FromRow)]
pub struct Doctor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub specialization: String,
    pub experience_years: i32,
    pub fees: Decimal,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Doctor shape returned to clients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DoctorResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub experience_years: i32,
    pub fees: Decimal,
    pub contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Doctor> for DoctorResponse {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            specialization: doctor.specialization,
            experience_years: doctor.experience_years,
            fees: doctor.fees,
            contact: doctor.contact,
            created_at: doctor.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterDoctorRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 2, max = 100, message = "Specialization must be 2-100 characters"))]
    pub specialization: String,
    #[validate(range(min = 0, max = 70, message = "Experience must be between 0 and 70 years"))]
    pub experience_years: i32,
    #[validate(range(min = 0.0, message = "Fees cannot be negative"))]
    pub fees: f64,
    pub contact: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDoctorRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Specialization must be 2-100 characters"))]
    pub specialization: Option<String>,
    #[validate(range(min = 0, max = 70, message = "Experience must be between 0 and 70 years"))]
    pub experience_years: Option<i32>,
    #[validate(range(min = 0.0, message = "Fees cannot be negative"))]
    pub fees: Option<f64>,
    pub contact: Option<String>,
}

/// Registration and login response for doctors
#[derive(Debug, Serialize)]
pub struct DoctorAuthResponse {
    pub doctor: DoctorResponse,
    pub access_token: String,
    pub refresh_token: String,
}

impl DoctorAuthResponse {
    pub fn new(doctor: Doctor, tokens: AuthTokens) -> Self {
        Self {
            doctor: doctor.into(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterDoctorRequest {
        RegisterDoctorRequest {
            name: "Dr. Karim Haddad".to_string(),
            email: "karim@example.com".to_string(),
            password: "long enough".to_string(),
            specialization: "Cardiology".to_string(),
            experience_years: 12,
            fees: 150.0,
            contact: Some("+213 555 987 654".to_string()),
        }
    }

    #[test]
    fn test_valid_registration_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_negative_fees_are_rejected() {
        let mut request = valid_request();
        request.fees = -1.0;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_short_password_is_rejected() {
        let mut request = valid_request();
        request.password = "short".to_string();
        assert!(request.validate().is_err());
    }
}
