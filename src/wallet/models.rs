use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Credit => "credit",
            TransactionType::Debit => "debit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl Default for TransactionStatus {
    fn default() -> Self {
        TransactionStatus::Completed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Wallet {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub balance: Decimal,
    pub daily_limit: Decimal,
    pub monthly_limit: Decimal,
    pub is_active: bool,
    pub last_transaction_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalletTransaction {
    pub id: i64,
    pub wallet_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub description: Option<String>,
    /// External idempotency handle for this entry
    pub reference_id: Uuid,
    pub status: TransactionStatus,
    pub appointment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreditRequest {
    pub patient_id: Uuid,
    pub amount: Decimal,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DebitRequest {
    pub patient_id: Uuid,
    pub amount: Decimal,
    #[validate(length(max = 200, message = "Description must be at most 200 characters"))]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub patient_id: Uuid,
    pub balance: Decimal,
    pub daily_limit: Decimal,
    pub monthly_limit: Decimal,
    pub is_active: bool,
    pub last_transaction_at: Option<DateTime<Utc>>,
}

impl From<Wallet> for BalanceResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            patient_id: wallet.patient_id,
            balance: wallet.balance,
            daily_limit: wallet.daily_limit,
            monthly_limit: wallet.monthly_limit,
            is_active: wallet.is_active,
            last_transaction_at: wallet.last_transaction_at,
        }
    }
}

/// Result of a credit or debit, echoing the new balance
#[derive(Debug, Serialize)]
pub struct TransactionReceipt {
    pub reference_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub balance: Decimal,
}
