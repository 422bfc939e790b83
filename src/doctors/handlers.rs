use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AuthError, AuthenticatedUser, LoginRequest, PasswordService, Role};
use crate::error::ApiError;
use crate::AppState;

use super::models::{
    DoctorAuthResponse, DoctorResponse, RegisterDoctorRequest, UpdateDoctorRequest,
};

fn fees_to_decimal(fees: f64) -> Result<Decimal, AuthError> {
    Decimal::from_f64_retain(fees)
        .ok_or_else(|| AuthError::ValidationError("Invalid fees amount".to_string()))
}

/// POST /api/doctors/register
#[utoipa::path(
    post,
    path = "/api/doctors/register",
    request_body = RegisterDoctorRequest,
    responses(
        (status = 201, description = "Doctor registered", body = DoctorResponse),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
    tag = "doctors"
)]
pub async fn register_doctor(
    State(state): State<AppState>,
    Json(payload): Json<RegisterDoctorRequest>,
) -> Result<(StatusCode, Json<DoctorAuthResponse>), AuthError> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;
    let fees = fees_to_decimal(payload.fees)?;

    let password_hash = PasswordService::hash_password(&payload.password)?;
    let doctor = state
        .doctors_repo
        .create(
            &payload.name,
            &payload.email,
            &password_hash,
            &payload.specialization,
            payload.experience_years,
            fees,
            payload.contact.as_deref(),
        )
        .await?;

    let tokens = state
        .token_service
        .generate_token_pair(doctor.id, &doctor.email, Role::Doctor)?;

    info!("registered doctor {} ({})", doctor.id, doctor.email);
    Ok((
        StatusCode::CREATED,
        Json(DoctorAuthResponse::new(doctor, tokens)),
    ))
}

/// POST /api/doctors/login
pub async fn login_doctor(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<DoctorAuthResponse>, AuthError> {
    payload
        .validate()
        .map_err(|e| AuthError::ValidationError(e.to_string()))?;

    let doctor = state
        .doctors_repo
        .find_by_email(&payload.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !PasswordService::verify_password(&payload.password, &doctor.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let tokens = state
        .token_service
        .generate_token_pair(doctor.id, &doctor.email, Role::Doctor)?;

    info!("doctor {} logged in", doctor.id);
    Ok(Json(DoctorAuthResponse::new(doctor, tokens)))
}

/// GET /api/doctors
#[utoipa::path(
    get,
    path = "/api/doctors",
    responses(
        (status = 200, description = "All doctors", body = [DoctorResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    tag = "doctors"
)]
pub async fn list_doctors(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Vec<DoctorResponse>>, ApiError> {
    let doctors = state.doctors_repo.list().await?;
    Ok(Json(doctors.into_iter().map(Into::into).collect()))
}

/// GET /api/doctors/:id
#[utoipa::path(
    get,
    path = "/api/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 200, description = "Doctor found", body = DoctorResponse),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors"
)]
pub async fn get_doctor(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DoctorResponse>, ApiError> {
    let doctor = state
        .doctors_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "doctor".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(doctor.into()))
}

/// PUT /api/doctors/:id
#[utoipa::path(
    put,
    path = "/api/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    request_body = UpdateDoctorRequest,
    responses(
        (status = 200, description = "Doctor updated", body = DoctorResponse),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors"
)]
pub async fn update_doctor(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDoctorRequest>,
) -> Result<Json<DoctorResponse>, ApiError> {
    payload.validate()?;
    let fees = match payload.fees {
        Some(f) => Some(
            Decimal::from_f64_retain(f)
                .ok_or_else(|| ApiError::InternalError("Invalid fees amount".to_string()))?,
        ),
        None => None,
    };

    let doctor = state
        .doctors_repo
        .update(id, &payload, fees)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "doctor".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(doctor.into()))
}

/// DELETE /api/doctors/:id
#[utoipa::path(
    delete,
    path = "/api/doctors/{id}",
    params(("id" = Uuid, Path, description = "Doctor id")),
    responses(
        (status = 204, description = "Doctor deleted"),
        (status = 404, description = "Doctor not found")
    ),
    tag = "doctors"
)]
pub async fn delete_doctor(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.doctors_repo.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound {
            resource: "doctor".to_string(),
            id: id.to_string(),
        })
    }
}
