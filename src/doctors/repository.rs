use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::AuthError;

use super::models::{Doctor, UpdateDoctorRequest};

const DOCTOR_COLUMNS: &str = "id, name, email, password_hash, specialization, experience_years, \
     fees, contact, created_at, updated_at";

#[derive(Clone)]
pub struct DoctorsRepository {
    pool: PgPool,
}

impl DoctorsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        specialization: &str,
        experience_years: i32,
        fees: Decimal,
        contact: Option<&str>,
    ) -> Result<Doctor, AuthError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "INSERT INTO doctors \
             (name, email, password_hash, specialization, experience_years, fees, contact) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(specialization)
        .bind(experience_years)
        .bind(fees)
        .bind(contact)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db_err) = &err {
                if db_err.is_unique_violation() {
                    return AuthError::EmailAlreadyExists;
                }
            }
            AuthError::DatabaseError(err.to_string())
        })
    }

    /// Case-insensitive email lookup
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Doctor>, AuthError> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| AuthError::DatabaseError(err.to_string()))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Doctor>, sqlx::Error> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list(&self) -> Result<Vec<Doctor>, sqlx::Error> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Partial update; untouched fields keep their current values
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateDoctorRequest,
        fees: Option<Decimal>,
    ) -> Result<Option<Doctor>, sqlx::Error> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query_as::<_, Doctor>(&format!(
            "UPDATE doctors \
             SET name = $2, specialization = $3, experience_years = $4, fees = $5, \
                 contact = $6, updated_at = NOW() \
             WHERE id = $1 RETURNING {DOCTOR_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.name.as_deref().unwrap_or(&existing.name))
        .bind(
            payload
                .specialization
                .as_deref()
                .unwrap_or(&existing.specialization),
        )
        .bind(payload.experience_years.unwrap_or(existing.experience_years))
        .bind(fees.unwrap_or(existing.fees))
        .bind(payload.contact.as_deref().or(existing.contact.as_deref()))
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transaction-scoped fetch used by the booking flow
    pub async fn fetch_in(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Doctor>, sqlx::Error> {
        sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }
}
