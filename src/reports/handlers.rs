use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::AppState;

use super::models::{CreateReportRequest, EarningsSummary, PatientReport};

/// POST /api/reports
pub async fn create_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<PatientReport>), ApiError> {
    payload.validate()?;

    let report = state.reports_repo.create(&payload).await.map_err(|err| {
        if let sqlx::Error::Database(db_err) = &err {
            // Unknown patient or doctor id trips the foreign keys.
            if db_err.is_foreign_key_violation() {
                return ApiError::NotFound {
                    resource: "patient or doctor".to_string(),
                    id: payload.patient_id.to_string(),
                };
            }
        }
        ApiError::DatabaseError(err)
    })?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// GET /api/reports/:id
pub async fn get_report(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientReport>, ApiError> {
    let report = state
        .reports_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound {
            resource: "report".to_string(),
            id: id.to_string(),
        })?;
    Ok(Json(report))
}

/// GET /api/reports/patient/:patient_id
pub async fn list_patient_reports(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<PatientReport>>, ApiError> {
    let reports = state.reports_repo.list_by_patient(patient_id).await?;
    Ok(Json(reports))
}

/// GET /api/reports/earnings/:doctor_id
pub async fn doctor_earnings(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<EarningsSummary>, ApiError> {
    let summary = state.reports_repo.earnings_for_doctor(doctor_id).await?;
    Ok(Json(summary))
}
