// Wallet ledger
// All balance changes go through here. The balance column is a running
// total; daily and monthly spending windows are recomputed from the
// ledger on every debit rather than stored.

use chrono::{DateTime, Datelike, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use super::error::WalletError;
use super::models::{TransactionType, Wallet, WalletTransaction};
use super::repository::WalletRepository;

/// Midnight UTC of the day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Midnight UTC on the first of the month containing `now`
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    first.and_time(NaiveTime::MIN).and_utc()
}

/// Pure admission check for a debit against balance and window totals
pub fn check_debit(
    wallet: &Wallet,
    daily_spent: Decimal,
    monthly_spent: Decimal,
    amount: Decimal,
) -> Result<(), WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount);
    }
    if !wallet.is_active {
        return Err(WalletError::Inactive);
    }
    if wallet.balance < amount {
        return Err(WalletError::InsufficientBalance);
    }
    if daily_spent + amount > wallet.daily_limit {
        return Err(WalletError::DailyLimitExceeded);
    }
    if monthly_spent + amount > wallet.monthly_limit {
        return Err(WalletError::MonthlyLimitExceeded);
    }
    Ok(())
}

/// High-level credit/debit operations over the wallet repository
#[derive(Clone)]
pub struct WalletLedger {
    pool: PgPool,
}

impl WalletLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Credit the patient's wallet in its own transaction
    pub async fn credit(
        &self,
        patient_id: Uuid,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<(Wallet, WalletTransaction), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;
        let wallet = WalletRepository::get_or_create_in(&mut *tx, patient_id).await?;
        if !wallet.is_active {
            return Err(WalletError::Inactive);
        }
        let entry = WalletRepository::append(
            &mut *tx,
            wallet.id,
            TransactionType::Credit,
            amount,
            description,
            None,
        )
        .await?;
        let balance = WalletRepository::apply_delta(&mut *tx, wallet.id, amount).await?;
        tx.commit().await?;

        info!(
            "credited wallet {} with {} (balance {})",
            wallet.id, amount, balance
        );
        Ok((Wallet { balance, ..wallet }, entry))
    }

    /// Debit the patient's wallet in its own transaction
    pub async fn debit(
        &self,
        patient_id: Uuid,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<(Wallet, WalletTransaction), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }

        let mut tx = self.pool.begin().await?;
        let (wallet, entry) =
            Self::debit_within(&mut *tx, patient_id, amount, description, None, Utc::now()).await?;
        tx.commit().await?;
        Ok((wallet, entry))
    }

    /// Debit inside a caller-owned transaction
    ///
    /// The wallet row is locked for the rest of the transaction, so the
    /// limit windows computed here cannot be invalidated by a concurrent
    /// debit. Returns the wallet with its post-debit balance.
    pub async fn debit_within(
        conn: &mut PgConnection,
        patient_id: Uuid,
        amount: Decimal,
        description: Option<&str>,
        appointment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(Wallet, WalletTransaction), WalletError> {
        WalletRepository::get_or_create_in(&mut *conn, patient_id).await?;
        let wallet = WalletRepository::lock(&mut *conn, patient_id)
            .await?
            .ok_or(WalletError::NotFound)?;

        let daily_spent =
            WalletRepository::debit_total_since(&mut *conn, wallet.id, start_of_day(now)).await?;
        let monthly_spent =
            WalletRepository::debit_total_since(&mut *conn, wallet.id, start_of_month(now)).await?;

        check_debit(&wallet, daily_spent, monthly_spent, amount)?;

        let entry = WalletRepository::append(
            &mut *conn,
            wallet.id,
            TransactionType::Debit,
            amount,
            description,
            appointment_id,
        )
        .await?;
        let balance = WalletRepository::apply_delta(&mut *conn, wallet.id, -amount).await?;

        info!(
            "debited wallet {} by {} (balance {})",
            wallet.id, amount, balance
        );
        Ok((Wallet { balance, ..wallet }, entry))
    }

    /// Current wallet state, created lazily on first access
    pub async fn balance(&self, patient_id: Uuid) -> Result<Wallet, WalletError> {
        let repo = WalletRepository::new(self.pool.clone());
        Ok(repo.get_or_create(patient_id).await?)
    }

    pub fn repository(&self) -> WalletRepository {
        WalletRepository::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn wallet(balance: Decimal) -> Wallet {
        Wallet {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            balance,
            daily_limit: dec!(1000),
            monthly_limit: dec!(5000),
            is_active: true,
            last_transaction_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_debit_within_all_limits_is_allowed() {
        let w = wallet(dec!(500));
        assert!(check_debit(&w, dec!(0), dec!(0), dec!(50)).is_ok());
    }

    #[test]
    fn test_zero_and_negative_amounts_are_invalid() {
        let w = wallet(dec!(500));
        assert!(matches!(
            check_debit(&w, dec!(0), dec!(0), dec!(0)),
            Err(WalletError::InvalidAmount)
        ));
        assert!(matches!(
            check_debit(&w, dec!(0), dec!(0), dec!(-10)),
            Err(WalletError::InvalidAmount)
        ));
    }

    #[test]
    fn test_overdraft_is_refused() {
        let w = wallet(dec!(30));
        assert!(matches!(
            check_debit(&w, dec!(0), dec!(0), dec!(50)),
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_balance_checked_before_limits() {
        // Both would fail; the balance refusal wins.
        let w = wallet(dec!(30));
        assert!(matches!(
            check_debit(&w, dec!(990), dec!(0), dec!(50)),
            Err(WalletError::InsufficientBalance)
        ));
    }

    #[test]
    fn test_daily_limit_is_inclusive() {
        let w = wallet(dec!(2000));
        // Exactly reaching the limit is fine, exceeding it is not.
        assert!(check_debit(&w, dec!(950), dec!(950), dec!(50)).is_ok());
        assert!(matches!(
            check_debit(&w, dec!(951), dec!(951), dec!(50)),
            Err(WalletError::DailyLimitExceeded)
        ));
    }

    #[test]
    fn test_monthly_limit_is_enforced() {
        let w = wallet(dec!(2000));
        assert!(matches!(
            check_debit(&w, dec!(0), dec!(4990), dec!(50)),
            Err(WalletError::MonthlyLimitExceeded)
        ));
    }

    #[test]
    fn test_inactive_wallet_refuses_debits() {
        let mut w = wallet(dec!(500));
        w.is_active = false;
        assert!(matches!(
            check_debit(&w, dec!(0), dec!(0), dec!(50)),
            Err(WalletError::Inactive)
        ));
    }

    #[test]
    fn test_start_of_day_truncates_to_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 6, 17, 15, 42, 9).unwrap();
        assert_eq!(
            start_of_day(now),
            Utc.with_ymd_and_hms(2025, 6, 17, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_month_truncates_to_first() {
        let now = Utc.with_ymd_and_hms(2025, 6, 17, 15, 42, 9).unwrap();
        assert_eq!(
            start_of_month(now),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
    }
}
