// Authentication data models and DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Caller role carried in token claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Doctor => "doctor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Login request DTO shared by patients and doctors
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Token pair issued at registration and login
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub subject_id: Uuid,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Patient).unwrap(), "\"patient\"");
        assert_eq!(serde_json::to_string(&Role::Doctor).unwrap(), "\"doctor\"");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Patient.to_string(), "patient");
        assert_eq!(Role::Doctor.to_string(), "doctor");
    }
}
