use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::models::{TransactionStatus, TransactionType, Wallet, WalletTransaction};

const WALLET_COLUMNS: &str = "id, patient_id, balance, daily_limit, monthly_limit, is_active, \
     last_transaction_at, created_at, updated_at";

const TRANSACTION_COLUMNS: &str = "id, wallet_id, transaction_type, amount, description, \
     reference_id, status, appointment_id, created_at";

#[derive(Clone)]
pub struct WalletRepository {
    pool: PgPool,
}

impl WalletRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the patient's wallet, creating it with default limits on
    /// first access.
    pub async fn get_or_create(&self, patient_id: Uuid) -> Result<Wallet, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        Self::get_or_create_in(&mut *conn, patient_id).await
    }

    pub async fn find_by_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Option<Wallet>, sqlx::Error> {
        sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE patient_id = $1"
        ))
        .bind(patient_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Most recent ledger entries for a wallet, newest first
    pub async fn transactions(
        &self,
        wallet_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WalletTransaction>, sqlx::Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM wallet_transactions \
             WHERE wallet_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(wallet_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Transaction-scoped get-or-create; the insert races safely on the
    /// patient_id unique constraint.
    pub async fn get_or_create_in(
        conn: &mut PgConnection,
        patient_id: Uuid,
    ) -> Result<Wallet, sqlx::Error> {
        sqlx::query("INSERT INTO wallets (patient_id) VALUES ($1) ON CONFLICT (patient_id) DO NOTHING")
            .bind(patient_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE patient_id = $1"
        ))
        .bind(patient_id)
        .fetch_one(conn)
        .await
    }

    /// Lock the wallet row for the rest of the enclosing transaction
    pub async fn lock(
        conn: &mut PgConnection,
        patient_id: Uuid,
    ) -> Result<Option<Wallet>, sqlx::Error> {
        sqlx::query_as::<_, Wallet>(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE patient_id = $1 FOR UPDATE"
        ))
        .bind(patient_id)
        .fetch_optional(conn)
        .await
    }

    /// Sum of completed debits recorded at or after `since`
    pub async fn debit_total_since(
        conn: &mut PgConnection,
        wallet_id: Uuid,
        since: chrono::DateTime<chrono::Utc>,
    ) -> Result<Decimal, sqlx::Error> {
        let total: Option<Decimal> = sqlx::query_scalar(
            "SELECT SUM(amount) FROM wallet_transactions \
             WHERE wallet_id = $1 AND transaction_type = 'debit' \
               AND status = 'completed' AND created_at >= $2",
        )
        .bind(wallet_id)
        .bind(since)
        .fetch_one(conn)
        .await?;
        Ok(total.unwrap_or_default())
    }

    /// Append a completed ledger entry
    pub async fn append(
        conn: &mut PgConnection,
        wallet_id: Uuid,
        transaction_type: TransactionType,
        amount: Decimal,
        description: Option<&str>,
        appointment_id: Option<Uuid>,
    ) -> Result<WalletTransaction, sqlx::Error> {
        sqlx::query_as::<_, WalletTransaction>(&format!(
            "INSERT INTO wallet_transactions \
             (wallet_id, transaction_type, amount, description, reference_id, status, appointment_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TRANSACTION_COLUMNS}"
        ))
        .bind(wallet_id)
        .bind(transaction_type)
        .bind(amount)
        .bind(description)
        .bind(Uuid::new_v4())
        .bind(TransactionStatus::Completed)
        .bind(appointment_id)
        .fetch_one(conn)
        .await
    }

    /// Apply a signed balance delta and stamp the activity time
    pub async fn apply_delta(
        conn: &mut PgConnection,
        wallet_id: Uuid,
        delta: Decimal,
    ) -> Result<Decimal, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE wallets \
             SET balance = balance + $2, last_transaction_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
             RETURNING balance",
        )
        .bind(wallet_id)
        .bind(delta)
        .fetch_one(conn)
        .await
    }
}
