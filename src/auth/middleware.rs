// Authentication extractor for protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Role, token::TokenService};

/// Authenticated caller extractor for protected routes
///
/// Handlers take this as an argument to require a valid Bearer token;
/// the orchestrator and services below it never re-authenticate.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("JWT_SECRET not configured".to_string()))?;

        let token_service = TokenService::new(jwt_secret);
        let claims = token_service.validate_token(token)?;

        Ok(AuthenticatedUser {
            subject_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(auth_value: &str) -> Parts {
        let req = Request::builder()
            .uri("/")
            .header(header::AUTHORIZATION, auth_value)
            .body(())
            .unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    fn parts_without_auth() -> Parts {
        let req = Request::builder().uri("/").body(()).unwrap();
        let (parts, _) = req.into_parts();
        parts
    }

    #[tokio::test]
    async fn test_valid_token_is_accepted() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let service = TokenService::new("test_secret_key_for_testing_purposes".to_string());
        let subject = Uuid::new_v4();
        let token = service
            .generate_access_token(subject, "p@example.com", Role::Patient)
            .unwrap();

        let mut parts = parts_with_auth(&format!("Bearer {}", token));
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(user.subject_id, subject);
        assert_eq!(user.email, "p@example.com");
        assert_eq!(user.role, Role::Patient);
    }

    #[tokio::test]
    async fn test_missing_authorization_header() {
        let mut parts = parts_without_auth();
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result.unwrap_err(), AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_invalid_bearer_format() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        for auth_value in ["InvalidFormat token", "token_without_bearer", "Basic dXNlcjpwYXNz"] {
            let mut parts = parts_with_auth(auth_value);
            let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
            assert!(result.is_err());
        }
    }

    #[tokio::test]
    async fn test_malformed_token_is_rejected() {
        std::env::set_var("JWT_SECRET", "test_secret_key_for_testing_purposes");

        let mut parts = parts_with_auth("Bearer not.a.valid.jwt");
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(result.is_err());
    }
}
