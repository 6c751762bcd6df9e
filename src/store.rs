//! Shared in-process state container.
//!
//! Every repository clones one [`Store`] handle, the way the repositories in
//! a pooled-database deployment clone one pool. A single write guard spans
//! each multi-entity mutation (balance change + ledger append + record
//! insert), which is the transactional boundary required by the ledger
//! invariants: a failure inside the guard leaves no partial state behind.

use crate::error::{AppError, AppResult};
use crate::models::{
    Listing, Purchase, Transaction, TransactionStatus, TransactionType, User, Wallet,
};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// All entity maps plus the ledger sequence counter
#[derive(Debug, Default)]
pub struct StoreInner {
    pub users: HashMap<Uuid, User>,
    pub listings: HashMap<Uuid, Listing>,
    pub purchases: HashMap<Uuid, Purchase>,
    pub wallets: HashMap<Uuid, Wallet>,
    pub transactions: HashMap<Uuid, Transaction>,
    next_seq: u64,
}

/// Everything needed to append one ledger entry
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub user_id: Uuid,
    pub tx_type: TransactionType,
    /// Signed: credits positive, debits negative
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub listing_id: Option<Uuid>,
    pub purchase_id: Option<Uuid>,
    pub remark: Option<String>,
    pub proof: Option<String>,
    pub payout_account: Option<String>,
}

impl StoreInner {
    /// Fetch the wallet for a user, creating a zero-balance one on first use
    pub fn wallet_entry(&mut self, user_id: Uuid) -> &mut Wallet {
        self.wallets
            .entry(user_id)
            .or_insert_with(|| Wallet::new(user_id))
    }

    /// The single balance-mutation path for newly appended entries.
    ///
    /// Terminal positive amounts credit the balance; terminal negative
    /// amounts re-validate sufficiency immediately before debiting, so a
    /// concurrent debit admitted earlier under the same guard is observed.
    /// Pending entries never move the balance.
    pub fn apply_entry(&mut self, entry: LedgerEntry, now: NaiveDateTime) -> AppResult<Transaction> {
        let seq = self.next_seq;
        self.next_seq += 1;

        let wallet = self.wallet_entry(entry.user_id);
        let balance_before = wallet.balance;

        if entry.status.is_terminal() {
            if entry.amount < Decimal::ZERO {
                let required = -entry.amount;
                let available = wallet.available();
                if available < required {
                    return Err(AppError::InsufficientBalance {
                        available,
                        required,
                    });
                }
            }
            wallet.balance += entry.amount;
            wallet.updated_at = now;
        }
        let balance_after = wallet.balance;

        let transaction = Transaction {
            id: Uuid::new_v4(),
            seq,
            user_id: entry.user_id,
            listing_id: entry.listing_id,
            purchase_id: entry.purchase_id,
            tx_type: entry.tx_type,
            amount: entry.amount,
            status: entry.status,
            balance_before,
            balance_after,
            remark: entry.remark,
            proof: entry.proof,
            payout_account: entry.payout_account,
            created_at: now,
            reviewed_by: None,
            reviewed_at: None,
        };

        self.transactions.insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    /// The unsettled purchase on a listing, if any
    pub fn active_purchase_for(&self, listing_id: Uuid) -> Option<&Purchase> {
        self.purchases
            .values()
            .find(|p| p.listing_id == listing_id && !p.settled)
    }

    /// Whether a completed repay entry already references the purchase
    pub fn has_completed_repay(&self, purchase_id: Uuid) -> bool {
        self.transactions.values().any(|t| {
            t.purchase_id == Some(purchase_id)
                && t.tx_type == TransactionType::Repay
                && t.status == TransactionStatus::Completed
        })
    }
}

/// Record counts for health reporting
#[derive(Debug, Clone, Default)]
pub struct StoreCounts {
    pub users: usize,
    pub listings: usize,
    pub purchases: usize,
    pub wallets: usize,
    pub transactions: usize,
}

/// Cloneable handle to the shared state container
#[derive(Clone, Default)]
pub struct Store {
    inner: Arc<RwLock<StoreInner>>,
}

impl Store {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the shared read guard
    pub async fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().await
    }

    /// Acquire the exclusive write guard (the transactional boundary)
    pub async fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().await
    }

    /// Snapshot record counts
    pub async fn counts(&self) -> StoreCounts {
        let inner = self.inner.read().await;
        StoreCounts {
            users: inner.users.len(),
            listings: inner.listings.len(),
            purchases: inner.purchases.len(),
            wallets: inner.wallets.len(),
            transactions: inner.transactions.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }

    fn credit(user_id: Uuid, amount: i64) -> LedgerEntry {
        LedgerEntry {
            user_id,
            tx_type: TransactionType::Recharge,
            amount: Decimal::new(amount, 0),
            status: TransactionStatus::Completed,
            listing_id: None,
            purchase_id: None,
            remark: None,
            proof: None,
            payout_account: None,
        }
    }

    #[tokio::test]
    async fn test_apply_entry_credits_and_debits() {
        let store = Store::new();
        let user = Uuid::new_v4();
        let mut inner = store.write().await;

        let tx = inner.apply_entry(credit(user, 100), now()).unwrap();
        assert_eq!(tx.balance_before, Decimal::ZERO);
        assert_eq!(tx.balance_after, Decimal::new(100, 0));

        let mut debit = credit(user, 0);
        debit.amount = Decimal::new(-40, 0);
        debit.tx_type = TransactionType::Purchase;
        let tx = inner.apply_entry(debit, now()).unwrap();
        assert_eq!(tx.balance_after, Decimal::new(60, 0));
        assert_eq!(inner.wallets[&user].balance, Decimal::new(60, 0));
    }

    #[tokio::test]
    async fn test_apply_entry_rejects_overdraw() {
        let store = Store::new();
        let user = Uuid::new_v4();
        let mut inner = store.write().await;

        let mut debit = credit(user, 0);
        debit.amount = Decimal::new(-1, 0);
        let err = inner.apply_entry(debit, now()).unwrap_err();
        assert!(matches!(err, AppError::InsufficientBalance { .. }));
        // No ledger entry and no balance change on failure
        assert!(inner.transactions.is_empty());
        assert_eq!(inner.wallets[&user].balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_pending_entry_does_not_move_balance() {
        let store = Store::new();
        let user = Uuid::new_v4();
        let mut inner = store.write().await;

        let mut entry = credit(user, 500);
        entry.status = TransactionStatus::Pending;
        let tx = inner.apply_entry(entry, now()).unwrap();
        assert_eq!(tx.balance_before, tx.balance_after);
        assert_eq!(inner.wallets[&user].balance, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_seq_is_monotonic() {
        let store = Store::new();
        let user = Uuid::new_v4();
        let mut inner = store.write().await;

        let a = inner.apply_entry(credit(user, 1), now()).unwrap();
        let b = inner.apply_entry(credit(user, 1), now()).unwrap();
        assert!(b.seq > a.seq);
    }
}
