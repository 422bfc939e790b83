use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::auth::AuthError;

use super::models::{Patient, UpdatePatientRequest};

const PATIENT_COLUMNS: &str =
    "id, name, email, password_hash, age, gender, phone, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PatientsRepository {
    pool: PgPool,
}

impl PatientsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new patient; duplicate emails surface as
    /// [`AuthError::EmailAlreadyExists`].
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        age: i32,
        gender: &str,
        phone: &str,
    ) -> Result<Patient, AuthError> {
        sqlx::query_as::<_, Patient>(&format!(
            "INSERT INTO patients (name, email, password_hash, age, gender, phone) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(age)
        .bind(gender)
        .bind(phone)
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
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, AuthError> {
        sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| AuthError::DatabaseError(err.to_string()))
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list(&self) -> Result<Vec<Patient>, sqlx::Error> {
        sqlx::query_as::<_, Patient>(&format!(
            "SELECT {PATIENT_COLUMNS} FROM patients ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// Partial update; untouched fields keep their current values
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdatePatientRequest,
    ) -> Result<Option<Patient>, sqlx::Error> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        sqlx::query_as::<_, Patient>(&format!(
            "UPDATE patients \
             SET name = $2, age = $3, gender = $4, phone = $5, updated_at = NOW() \
             WHERE id = $1 RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(id)
        .bind(payload.name.as_deref().unwrap_or(&existing.name))
        .bind(payload.age.unwrap_or(existing.age))
        .bind(payload.gender.as_deref().unwrap_or(&existing.gender))
        .bind(payload.phone.as_deref().unwrap_or(&existing.phone))
        .fetch_optional(&self.pool)
        .await
    }

    /// Delete a patient; the wallet and its ledger go with it via
    /// cascading foreign keys.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transaction-scoped existence check
    pub async fn exists(conn: &mut PgConnection, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM patients WHERE id = $1 AND is_active)")
            .bind(id)
            .fetch_one(conn)
            .await
    }
}
