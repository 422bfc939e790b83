use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthTokens;
use crate::validation::{validate_gender, validate_phone};
use crate::wallet::models::BalanceResponse;

#[derive(Debug, Clone, FromRow)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Patient shape returned to clients; never carries the password hash
#[derive(Debug, Clone, Serialize)]
pub struct PatientResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub age: i32,
    pub gender: String,
    pub phone: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            email: patient.email,
            age: patient.age,
            gender: patient.gender,
            phone: patient.phone,
            is_active: patient.is_active,
            created_at: patient.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPatientRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(range(min = 0, max = 120, message = "Age must be between 0 and 120"))]
    pub age: i32,
    #[validate(custom = "validate_gender")]
    pub gender: String,
    #[validate(custom = "validate_phone")]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePatientRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 120, message = "Age must be between 0 and 120"))]
    pub age: Option<i32>,
    #[validate(custom = "validate_gender")]
    pub gender: Option<String>,
    #[validate(custom = "validate_phone")]
    pub phone: Option<String>,
}

/// Registration and login response: profile, wallet, token pair
#[derive(Debug, Serialize)]
pub struct PatientAuthResponse {
    pub patient: PatientResponse,
    pub wallet: BalanceResponse,
    pub access_token: String,
    pub refresh_token: String,
}

impl PatientAuthResponse {
    pub fn new(patient: Patient, wallet: BalanceResponse, tokens: AuthTokens) -> Self {
        Self {
            patient: patient.into(),
            wallet,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> RegisterPatientRequest {
        RegisterPatientRequest {
            name: "Amira Benali".to_string(),
            email: "amira@example.com".to_string(),
            password: "correct horse".to_string(),
            age: 34,
            gender: "female".to_string(),
            phone: "+213 555 123 456".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes_validation() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_bad_email_is_rejected() {
        let mut request = valid_request();
        request.email = "not-an-email".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_out_of_range_age_is_rejected() {
        let mut request = valid_request();
        request.age = 130;
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_unknown_gender_is_rejected() {
        let mut request = valid_request();
        request.gender = "unknown".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_response_omits_password_hash() {
        let json = serde_json::to_value(PatientResponse {
            id: Uuid::new_v4(),
            name: "Amira".to_string(),
            email: "amira@example.com".to_string(),
            age: 34,
            gender: "female".to_string(),
            phone: "+213 555 123 456".to_string(),
            is_active: true,
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
