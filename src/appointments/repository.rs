use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::discount::DiscountContext;
use super::models::{
    Appointment, AppointmentQuery, AppointmentStatus, CancelledBy, NewAppointment,
};

const APPOINTMENT_COLUMNS: &str = "id, patient_id, doctor_id, appointment_date, status, reason, \
     discount_used, fees_amount, fees_paid, fees_paid_at, \
     cancellation_reason, cancelled_by, cancelled_at, created_at, updated_at";

#[derive(Clone)]
pub struct AppointmentsRepository {
    pool: PgPool,
}

impl AppointmentsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List appointments matching the optional filters, soonest first
    pub async fn list(&self, query: &AppointmentQuery) -> Result<Vec<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments \
             WHERE ($1::uuid IS NULL OR patient_id = $1) \
               AND ($2::uuid IS NULL OR doctor_id = $2) \
               AND ($3::text IS NULL OR status = $3) \
               AND ($4::boolean IS NOT TRUE OR appointment_date >= NOW()) \
             ORDER BY appointment_date ASC"
        ))
        .bind(query.patient_id)
        .bind(query.doctor_id)
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.upcoming)
        .fetch_all(&self.pool)
        .await
    }

    /// Completing an appointment also settles its fee
    pub async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments \
             SET status = $2, \
                 fees_paid = (fees_paid OR $2 = 'completed'), \
                 fees_paid_at = CASE \
                     WHEN fees_paid_at IS NULL AND $2 = 'completed' THEN NOW() \
                     ELSE fees_paid_at END, \
                 updated_at = NOW() \
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn cancel(
        &self,
        id: Uuid,
        reason: Option<&str>,
        cancelled_by: CancelledBy,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "UPDATE appointments \
             SET status = 'cancelled', cancellation_reason = $2, cancelled_by = $3, \
                 cancelled_at = NOW(), updated_at = NOW() \
             WHERE id = $1 RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(reason)
        .bind(cancelled_by)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any live appointment occupies [start, end) for the doctor
    pub async fn slot_taken(
        conn: &mut PgConnection,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS ( \
               SELECT 1 FROM appointments \
               WHERE doctor_id = $1 AND status <> 'cancelled' \
                 AND appointment_date >= $2 AND appointment_date < $3)",
        )
        .bind(doctor_id)
        .bind(start)
        .bind(end)
        .fetch_one(conn)
        .await
    }

    /// Insert inside the booking transaction; unique violations on the
    /// doctor/slot index surface as sqlx database errors.
    pub async fn insert(
        conn: &mut PgConnection,
        new: &NewAppointment,
    ) -> Result<Appointment, sqlx::Error> {
        sqlx::query_as::<_, Appointment>(&format!(
            "INSERT INTO appointments \
             (id, patient_id, doctor_id, appointment_date, status, reason, discount_used, fees_amount) \
             VALUES ($1, $2, $3, $4, 'scheduled', $5, $6, $7) \
             RETURNING {APPOINTMENT_COLUMNS}"
        ))
        .bind(new.id)
        .bind(new.patient_id)
        .bind(new.doctor_id)
        .bind(new.appointment_date)
        .bind(new.reason.as_deref())
        .bind(new.discount_used)
        .bind(new.fees_amount)
        .fetch_one(conn)
        .await
    }

    /// Gather the history facts the discount rules run over
    pub async fn discount_context(
        conn: &mut PgConnection,
        patient_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<DiscountContext, sqlx::Error> {
        // One discount per doctor, ever. Cancelling does not refund the
        // debit, so cancelled rows still count.
        let used_discount_with_doctor: bool = sqlx::query_scalar(
            "SELECT EXISTS ( \
               SELECT 1 FROM appointments \
               WHERE patient_id = $1 AND doctor_id = $2 AND discount_used = TRUE)",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&mut *conn)
        .await?;

        let active_scheduled: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE patient_id = $1 AND status = 'scheduled' AND appointment_date >= NOW()",
        )
        .bind(patient_id)
        .fetch_one(&mut *conn)
        .await?;

        let completed_with_doctor: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointments \
             WHERE patient_id = $1 AND doctor_id = $2 AND status = 'completed'",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&mut *conn)
        .await?;

        let last_completed_with_doctor: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT MAX(appointment_date) FROM appointments \
             WHERE patient_id = $1 AND doctor_id = $2 AND status = 'completed'",
        )
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(DiscountContext {
            used_discount_with_doctor,
            active_scheduled,
            completed_with_doctor,
            last_completed_with_doctor,
        })
    }
}
