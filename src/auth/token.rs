// JWT token generation and validation service

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::AuthTokens, models::Role};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // patient or doctor id
    pub email: String,
    pub role: Role,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

/// Token service for JWT operations
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    access_token_duration: i64,  // in seconds
    refresh_token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Access tokens expire in 15 minutes, refresh tokens in 7 days
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            access_token_duration: 900,
            refresh_token_duration: 604800,
        }
    }

    /// Generate an access token (15 minutes)
    pub fn generate_access_token(
        &self,
        subject: Uuid,
        email: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        self.generate_token(subject, email, role, self.access_token_duration)
    }

    /// Generate a refresh token (7 days)
    pub fn generate_refresh_token(
        &self,
        subject: Uuid,
        email: &str,
        role: Role,
    ) -> Result<String, AuthError> {
        self.generate_token(subject, email, role, self.refresh_token_duration)
    }

    fn generate_token(
        &self,
        subject: Uuid,
        email: &str,
        role: Role,
        duration: i64,
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            role,
            iat: now,
            exp: now + duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }

    /// Generate both access and refresh tokens
    pub fn generate_token_pair(
        &self,
        subject: Uuid,
        email: &str,
        role: Role,
    ) -> Result<AuthTokens, AuthError> {
        let access_token = self.generate_access_token(subject, email, role)?;
        let refresh_token = self.generate_refresh_token(subject, email, role)?;
        Ok(AuthTokens {
            access_token,
            refresh_token,
            subject_id: subject,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string())
    }

    #[test]
    fn test_access_token_expiration_is_15_minutes() {
        let service = test_token_service();
        let token = service
            .generate_access_token(Uuid::new_v4(), "test@example.com", Role::Patient)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 900);
    }

    #[test]
    fn test_refresh_token_expiration_is_7_days() {
        let service = test_token_service();
        let token = service
            .generate_refresh_token(Uuid::new_v4(), "test@example.com", Role::Patient)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.exp - claims.iat, 604800);
    }

    #[test]
    fn test_token_claims_contain_identity_and_role() {
        let service = test_token_service();
        let subject = Uuid::new_v4();

        let token = service
            .generate_access_token(subject, "doc@example.com", Role::Doctor)
            .unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, subject);
        assert_eq!(claims.email, "doc@example.com");
        assert_eq!(claims.role, Role::Doctor);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.validate_token("").is_err());
        assert!(service.validate_token("not.a.token").is_err());
        assert!(service
            .validate_token("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1".to_string());
        let service2 = TokenService::new("secret2".to_string());

        let token = service1
            .generate_access_token(Uuid::new_v4(), "test@example.com", Role::Patient)
            .unwrap();

        assert!(service1.validate_token(&token).is_ok());
        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_token_service();

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            role: Role::Patient,
            iat: Utc::now().timestamp() - 1000,
            exp: Utc::now().timestamp() - 500,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test_secret_key_for_testing_purposes".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    proptest! {
        #[test]
        fn prop_valid_tokens_round_trip(
            email in "[a-z]{3,10}@[a-z]{3,10}\\.(com|org|net)"
        ) {
            let service = test_token_service();
            let subject = Uuid::new_v4();

            let token = service.generate_access_token(subject, &email, Role::Patient)?;
            let claims = service.validate_token(&token)?;

            prop_assert_eq!(claims.sub, subject);
            prop_assert_eq!(claims.email, email);
        }

        #[test]
        fn prop_malformed_tokens_rejected(malformed in "[a-zA-Z0-9]{10,50}") {
            let service = test_token_service();
            prop_assert!(service.validate_token(&malformed).is_err());
        }
    }
}
