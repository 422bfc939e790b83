use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::AppState;

use super::error::WalletError;
use super::models::{
    BalanceResponse, CreditRequest, DebitRequest, TransactionReceipt, WalletTransaction,
};

/// GET /api/wallets/:patient_id/balance
pub async fn get_balance(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<BalanceResponse>, WalletError> {
    let wallet = state.wallet_ledger.balance(patient_id).await?;
    Ok(Json(wallet.into()))
}

/// POST /api/wallets/credit
pub async fn credit_wallet(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<CreditRequest>,
) -> Result<(StatusCode, Json<TransactionReceipt>), WalletError> {
    payload
        .validate()
        .map_err(|e| WalletError::ValidationError(e.to_string()))?;

    let (wallet, entry) = state
        .wallet_ledger
        .credit(payload.patient_id, payload.amount, payload.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionReceipt {
            reference_id: entry.reference_id,
            transaction_type: entry.transaction_type,
            amount: entry.amount,
            balance: wallet.balance,
        }),
    ))
}

/// POST /api/wallets/debit
pub async fn debit_wallet(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Json(payload): Json<DebitRequest>,
) -> Result<(StatusCode, Json<TransactionReceipt>), WalletError> {
    payload
        .validate()
        .map_err(|e| WalletError::ValidationError(e.to_string()))?;

    let (wallet, entry) = state
        .wallet_ledger
        .debit(payload.patient_id, payload.amount, payload.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionReceipt {
            reference_id: entry.reference_id,
            transaction_type: entry.transaction_type,
            amount: entry.amount,
            balance: wallet.balance,
        }),
    ))
}

/// GET /api/wallets/:patient_id/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<WalletTransaction>>, WalletError> {
    let repo = state.wallet_ledger.repository();
    let wallet = repo
        .find_by_patient(patient_id)
        .await?
        .ok_or(WalletError::NotFound)?;
    let entries = repo.transactions(wallet.id, 100).await?;
    Ok(Json(entries))
}
