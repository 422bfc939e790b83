use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthError, AuthenticatedUser, LoginRequest, PasswordService, Role};
use crate::error::ApiError;
use crate::AppState;

use super::models::{
    PatientAuthResponse, PatientResponse, RegisterPatientRequest, UpdatePatientRequest,
};

/// POST /api/patients/register
pub async fn register_patient(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPatientRequest>,
) -> Result<(StatusCode, Json<PatientAuthResponse>), AuthError> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let password_hash = PasswordService::hash_password(&payload.password)?;
    let patient = state
        .patients_repo
        .create(
            &payload.name,
            &payload.email,
            &password_hash,
            payload.age,
            &payload.gender.to_lowercase(),
            &payload.phone,
        )
        .await?;

    // The wallet exists from registration onward.
    let wallet = state
        .wallet_ledger
        .balance(patient.id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    let tokens = state
        .token_service
        .generate_token_pair(patient.id, &patient.email, Role::Patient)?;

    info!("registered patient {} ({})", patient.id, patient.email);
    Ok((
        StatusCode::CREATED,
        Json(PatientAuthResponse::new(patient, wallet.into(), tokens)),
    ))
}

/// POST /api/patients/login
pub async fn login_patient(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<PatientAuthResponse>, AuthError> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let patient = state
        .patients_repo
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !PasswordService::verify_password(&payload.password, &patient.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let wallet = state
        .wallet_ledger
        .balance(patient.id)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

    let tokens = state
        .token_service
        .generate_token_pair(patient.id, &patient.email, Role::Patient)?;

    info!("patient {} logged in", patient.id);
    Ok(Json(PatientAuthResponse::new(patient, wallet.into(), tokens)))
}

/// GET /api/patients
pub async fn list_patients(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<PatientResponse>>, ApiError> {
    let patients = state.patients_repo.list().await?;
    Ok(Json(patients.into_iter().map(Into::into).collect()))
}

/// GET /api/patients/:id
pub async fn get_patient(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientResponse>, ApiError> {
    let patient = state
        .patients_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "patient".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(patient.into()))
}

/// PUT /api/patients/:id
pub async fn update_patient(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePatientRequest>,
) -> Result<Json<PatientResponse>, ApiError> {
    payload.validate()?;

    let patient = state
        .patients_repo
        .update(id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "patient".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(patient.into()))
}

/// DELETE /api/patients/:id
pub async fn delete_patient(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.patients_repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound {
            resource: "patient".to_string(),
            id: id.to_string(),
        })
    }
}
