//! Repository for wallet balances and the transaction ledger

use crate::error::{AppError, AppResult};
use crate::models::{
    PeriodStat, ReviewDecision, Transaction, TransactionFilter, TransactionStatus,
    TransactionType, Wallet, WalletStatistics,
};
use crate::store::{LedgerEntry, Store};
use chrono::{Datelike, Duration, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct WalletRepository {
    store: Store,
}

impl WalletRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // =========================================================================
    // Wallet Operations
    // =========================================================================

    pub async fn get_wallet(&self, user_id: Uuid) -> AppResult<Option<Wallet>> {
        let inner = self.store.read().await;
        Ok(inner.wallets.get(&user_id).cloned())
    }

    pub async fn get_or_create_wallet(&self, user_id: Uuid) -> AppResult<Wallet> {
        let mut inner = self.store.write().await;
        Ok(inner.wallet_entry(user_id).clone())
    }

    /// Store the sha256 digest of a payment password
    pub async fn set_payment_password(&self, user_id: Uuid, password: &str) -> AppResult<Wallet> {
        if password.len() < 6 {
            return Err(AppError::Validation(
                "Payment password must be at least 6 characters".into(),
            ));
        }
        let mut inner = self.store.write().await;
        let wallet = inner.wallet_entry(user_id);
        wallet.payment_password_hash = Some(Wallet::hash_payment_password(password));
        wallet.updated_at = chrono::Utc::now().naive_utc();
        Ok(wallet.clone())
    }

    pub async fn verify_payment_password(&self, user_id: Uuid, password: &str) -> AppResult<bool> {
        let inner = self.store.read().await;
        let wallet = inner
            .wallets
            .get(&user_id)
            .ok_or_else(|| AppError::NotFound(format!("Wallet for user {} not found", user_id)))?;
        Ok(wallet.verify_payment_password(password))
    }

    /// Append a terminal ledger entry and apply its balance effect in one
    /// unit. Used for entries born completed (corrections, counter-entries).
    pub async fn apply_completed(
        &self,
        user_id: Uuid,
        tx_type: TransactionType,
        amount: Decimal,
        remark: Option<String>,
        now: NaiveDateTime,
    ) -> AppResult<(Wallet, Transaction)> {
        if amount == Decimal::ZERO {
            return Err(AppError::Validation("Amount must not be zero".into()));
        }
        let mut inner = self.store.write().await;
        let transaction = inner.apply_entry(
            LedgerEntry {
                user_id,
                tx_type,
                amount,
                status: TransactionStatus::Completed,
                listing_id: None,
                purchase_id: None,
                remark,
                proof: None,
                payout_account: None,
            },
            now,
        )?;
        let wallet = inner.wallet_entry(user_id).clone();
        Ok((wallet, transaction))
    }

    // =========================================================================
    // Audit Submissions
    // =========================================================================

    /// Queue a recharge request; no balance effect until approval
    pub async fn submit_recharge(
        &self,
        user_id: Uuid,
        amount: Decimal,
        proof: Option<String>,
        now: NaiveDateTime,
    ) -> AppResult<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Recharge amount must be positive".into()));
        }
        let mut inner = self.store.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }
        inner.apply_entry(
            LedgerEntry {
                user_id,
                tx_type: TransactionType::Recharge,
                amount,
                status: TransactionStatus::Pending,
                listing_id: None,
                purchase_id: None,
                remark: None,
                proof,
                payout_account: None,
            },
            now,
        )
    }

    /// Queue a withdraw request and reserve the amount from the available
    /// balance so it cannot be double-spent while awaiting review
    pub async fn submit_withdraw(
        &self,
        user_id: Uuid,
        amount: Decimal,
        payout_account: String,
        now: NaiveDateTime,
    ) -> AppResult<Transaction> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("Withdraw amount must be positive".into()));
        }
        let mut inner = self.store.write().await;
        if !inner.users.contains_key(&user_id) {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        let wallet = inner.wallet_entry(user_id);
        let available = wallet.available();
        if available < amount {
            return Err(AppError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        wallet.frozen += amount;
        wallet.updated_at = now;

        inner.apply_entry(
            LedgerEntry {
                user_id,
                tx_type: TransactionType::Withdraw,
                amount: -amount,
                status: TransactionStatus::Pending,
                listing_id: None,
                purchase_id: None,
                remark: None,
                proof: None,
                payout_account: Some(payout_account),
            },
            now,
        )
    }

    /// Apply an operator decision to a pending audited entry.
    ///
    /// Approving a recharge credits the balance; approving a withdraw
    /// releases the reservation and debits (the funds leave the platform);
    /// rejecting a withdraw releases the reservation back to available.
    /// Reviewing a terminal entry fails with `AlreadyReviewed`.
    pub async fn apply_review(
        &self,
        transaction_id: Uuid,
        decision: ReviewDecision,
        operator_id: Uuid,
        remark: Option<String>,
        now: NaiveDateTime,
    ) -> AppResult<Transaction> {
        let mut inner = self.store.write().await;

        let entry = inner
            .transactions
            .get(&transaction_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Transaction {} not found", transaction_id))
            })?
            .clone();

        if entry.status.is_terminal() {
            return Err(AppError::AlreadyReviewed(transaction_id));
        }

        let (new_status, balance_delta, frozen_delta) = match (entry.tx_type, decision) {
            (TransactionType::Recharge, ReviewDecision::Approve) => {
                (TransactionStatus::Completed, entry.amount, Decimal::ZERO)
            }
            (TransactionType::Recharge, ReviewDecision::Reject) => {
                (TransactionStatus::Rejected, Decimal::ZERO, Decimal::ZERO)
            }
            (TransactionType::Withdraw, ReviewDecision::Approve) => {
                // amount is stored negative; the reservation is consumed
                (TransactionStatus::Completed, entry.amount, entry.amount)
            }
            (TransactionType::Withdraw, ReviewDecision::Reject) => {
                (TransactionStatus::Rejected, Decimal::ZERO, entry.amount)
            }
            _ => {
                return Err(AppError::BusinessRule(format!(
                    "Transaction type {} is not auditable",
                    entry.tx_type.as_str()
                )));
            }
        };

        let wallet = inner.wallet_entry(entry.user_id);
        let balance_before = wallet.balance;
        wallet.balance += balance_delta;
        wallet.frozen += frozen_delta;
        wallet.updated_at = now;
        let balance_after = wallet.balance;

        let stored = inner
            .transactions
            .get_mut(&transaction_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Transaction {} not found", transaction_id))
            })?;
        stored.status = new_status;
        stored.balance_before = balance_before;
        stored.balance_after = balance_after;
        stored.reviewed_by = Some(operator_id);
        stored.reviewed_at = Some(now);
        if remark.is_some() {
            stored.remark = remark;
        }

        Ok(stored.clone())
    }

    /// Pending audited entries, oldest first, for the operator queue
    pub async fn pending_reviews(&self) -> AppResult<Vec<Transaction>> {
        let inner = self.store.read().await;
        let mut pending: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|t| t.status == TransactionStatus::Pending)
            .cloned()
            .collect();
        pending.sort_by_key(|t| t.seq);
        Ok(pending)
    }

    // =========================================================================
    // Ledger Queries
    // =========================================================================

    /// Filtered ledger listing, newest first
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> AppResult<Vec<Transaction>> {
        let inner = self.store.read().await;
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|t| filter.user_id.map_or(true, |u| t.user_id == u))
            .filter(|t| filter.tx_type.map_or(true, |ty| t.tx_type == ty))
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.from.map_or(true, |from| t.created_at >= from))
            .filter(|t| filter.to.map_or(true, |to| t.created_at <= to))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.seq.cmp(&a.seq));
        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    /// Aggregate income/expense over completed entries for the standard
    /// reporting windows, optionally scoped to one user
    pub async fn statistics(
        &self,
        now: NaiveDateTime,
        user_id: Option<Uuid>,
    ) -> AppResult<WalletStatistics> {
        let inner = self.store.read().await;

        let today = now.date();
        let yesterday = today - Duration::days(1);
        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

        let mut stats = WalletStatistics::default();
        for tx in inner.transactions.values() {
            if tx.status != TransactionStatus::Completed {
                continue;
            }
            if let Some(user) = user_id {
                if tx.user_id != user {
                    continue;
                }
            }

            let date = tx.created_at.date();
            if date == today {
                accumulate(&mut stats.today, tx.amount);
            }
            if date == yesterday {
                accumulate(&mut stats.yesterday, tx.amount);
            }
            if date >= week_start && date <= today {
                accumulate(&mut stats.this_week, tx.amount);
            }
            if date.year() == today.year() && date.month() == today.month() {
                accumulate(&mut stats.this_month, tx.amount);
            }
        }

        Ok(stats)
    }
}

fn accumulate(bucket: &mut PeriodStat, amount: Decimal) {
    if amount > Decimal::ZERO {
        bucket.income += amount;
    } else {
        bucket.expense += -amount;
    }
}
