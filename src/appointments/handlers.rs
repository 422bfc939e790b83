use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::AppState;

use super::error::AppointmentError;
use super::models::{
    Appointment, AppointmentQuery, BookAppointmentRequest, BookingResponse,
    CancelAppointmentRequest, UpdateStatusRequest,
};

/// POST /api/appointments/book
pub async fn book_appointment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppointmentError> {
    payload
        .validate()
        .map_err(|e| AppointmentError::ValidationError(e.to_string()))?;

    let response = state.booking_service.book(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/appointments
pub async fn list_appointments(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Query(query): Query<AppointmentQuery>,
) -> Result<Json<Vec<Appointment>>, AppointmentError> {
    let appointments = state.booking_service.list(&query).await?;
    Ok(Json(appointments))
}

/// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppointmentError> {
    let appointment = state.booking_service.get(id).await?;
    Ok(Json(appointment))
}

/// PATCH /api/appointments/:id/status
pub async fn update_appointment_status(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Appointment>, AppointmentError> {
    let appointment = state
        .booking_service
        .update_status(id, payload.status)
        .await?;
    Ok(Json(appointment))
}

/// POST /api/appointments/:id/cancel
pub async fn cancel_appointment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CancelAppointmentRequest>,
) -> Result<Json<Appointment>, AppointmentError> {
    payload
        .validate()
        .map_err(|e| AppointmentError::ValidationError(e.to_string()))?;

    let appointment = state.booking_service.cancel(id, payload).await?;
    Ok(Json(appointment))
}

/// DELETE /api/appointments/:id
pub async fn delete_appointment(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppointmentError> {
    state.booking_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
