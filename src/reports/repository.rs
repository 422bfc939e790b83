use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{CreateReportRequest, EarningsSummary, PatientReport};

const REPORT_COLUMNS: &str = "id, patient_id, doctor_id, consultation_date, symptoms, diagnosis, \
     treatment_plan, follow_up_date, created_at";

#[derive(Clone)]
pub struct ReportsRepository {
    pool: PgPool,
}

impl ReportsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: &CreateReportRequest) -> Result<PatientReport, sqlx::Error> {
        sqlx::query_as::<_, PatientReport>(&format!(
            "INSERT INTO patient_reports \
             (patient_id, doctor_id, consultation_date, symptoms, diagnosis, treatment_plan, follow_up_date) \
             VALUES ($1, $2, COALESCE($3, NOW()), $4, $5, $6, $7) \
             RETURNING {REPORT_COLUMNS}"
        ))
        .bind(payload.patient_id)
        .bind(payload.doctor_id)
        .bind(payload.consultation_date)
        .bind(&payload.symptoms)
        .bind(&payload.diagnosis)
        .bind(&payload.treatment_plan)
        .bind(payload.follow_up_date)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PatientReport>, sqlx::Error> {
        sqlx::query_as::<_, PatientReport>(&format!(
            "SELECT {REPORT_COLUMNS} FROM patient_reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// A patient's reports, newest consultation first
    pub async fn list_by_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<PatientReport>, sqlx::Error> {
        sqlx::query_as::<_, PatientReport>(&format!(
            "SELECT {REPORT_COLUMNS} FROM patient_reports \
             WHERE patient_id = $1 ORDER BY consultation_date DESC"
        ))
        .bind(patient_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Earnings from paid, non-cancelled appointments
    pub async fn earnings_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<EarningsSummary, sqlx::Error> {
        let row: (i64, Option<Decimal>) = sqlx::query_as(
            "SELECT COUNT(*), SUM(fees_amount) FROM appointments \
             WHERE doctor_id = $1 AND fees_paid = TRUE AND status <> 'cancelled'",
        )
        .bind(doctor_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EarningsSummary {
            doctor_id,
            paid_appointments: row.0,
            total_earnings: row.1.unwrap_or_default(),
        })
    }
}
