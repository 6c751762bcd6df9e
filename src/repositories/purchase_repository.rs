//! Repository for purchase creation and settlement
//!
//! Both operations are multi-entity atomic units: every check and mutation
//! happens under one store write guard, so concurrent attempts observe
//! either all of an operation's effects or none of them.

use crate::config::LedgerConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Purchase, Transaction, TransactionStatus, TransactionType};
use crate::store::{LedgerEntry, Store};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Result of running the repayment primitive
#[derive(Debug, Clone)]
pub enum RepaymentOutcome {
    /// Repayment credited and listing taken offline
    Applied {
        purchase: Purchase,
        transaction: Transaction,
    },
    /// The purchase was already settled; nothing changed
    AlreadySettled,
}

impl RepaymentOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, RepaymentOutcome::Applied { .. })
    }
}

pub struct PurchaseRepository {
    store: Store,
    ledger: LedgerConfig,
}

impl PurchaseRepository {
    pub fn new(store: Store, ledger: LedgerConfig) -> Self {
        Self { store, ledger }
    }

    /// Execute the atomic buy: claim the listing, debit the buyer, credit
    /// the author with the principal, and record the purchase.
    pub async fn create_purchase(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<(Purchase, Transaction)> {
        let mut inner = self.store.write().await;

        let listing = inner
            .listings
            .get(&listing_id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?
            .clone();

        if !listing.is_published() {
            return Err(AppError::ListingUnavailable(format!(
                "Listing is {}",
                listing.status.as_str()
            )));
        }
        if inner.active_purchase_for(listing_id).is_some() {
            return Err(AppError::ListingUnavailable(
                "Listing already has an active purchase".into(),
            ));
        }
        if listing.author_id == buyer_id {
            return Err(AppError::SelfPurchaseForbidden);
        }
        if !inner.users.contains_key(&buyer_id) {
            return Err(AppError::NotFound(format!("Buyer {} not found", buyer_id)));
        }

        let payee_id = self.ledger.proceeds_account.unwrap_or(buyer_id);
        let purchase = Purchase::new(
            listing_id,
            buyer_id,
            payee_id,
            listing.loan_amount,
            listing.repayment_amount,
            listing.period_days,
            now,
        );

        // Debit first: an insufficient balance aborts before any record lands
        let transaction = inner.apply_entry(
            LedgerEntry {
                user_id: buyer_id,
                tx_type: TransactionType::Purchase,
                amount: -listing.loan_amount,
                status: TransactionStatus::Completed,
                listing_id: Some(listing_id),
                purchase_id: Some(purchase.id),
                remark: Some(format!("Purchase of listing: {}", listing.title)),
                proof: None,
                payout_account: None,
            },
            now,
        )?;

        // The author receives the principal
        inner.apply_entry(
            LedgerEntry {
                user_id: listing.author_id,
                tx_type: TransactionType::SaleProceeds,
                amount: listing.loan_amount,
                status: TransactionStatus::Completed,
                listing_id: Some(listing_id),
                purchase_id: Some(purchase.id),
                remark: Some("Sale proceeds".into()),
                proof: None,
                payout_account: None,
            },
            now,
        )?;

        inner.purchases.insert(purchase.id, purchase.clone());
        Ok((purchase, transaction))
    }

    /// The shared repayment primitive, idempotent by construction: an
    /// already-settled purchase (settled flag, offline listing, or existing
    /// completed repay entry) is a no-op.
    pub async fn settle_purchase(
        &self,
        purchase_id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<RepaymentOutcome> {
        let mut inner = self.store.write().await;

        let purchase = inner
            .purchases
            .get(&purchase_id)
            .ok_or_else(|| AppError::NotFound(format!("Purchase {} not found", purchase_id)))?
            .clone();

        let listing = inner
            .listings
            .get(&purchase.listing_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Listing {} not found", purchase.listing_id))
            })?
            .clone();

        if purchase.settled || listing.is_offline() || inner.has_completed_repay(purchase_id) {
            return Ok(RepaymentOutcome::AlreadySettled);
        }

        let transaction = inner.apply_entry(
            LedgerEntry {
                user_id: purchase.payee_id,
                tx_type: TransactionType::Repay,
                amount: purchase.repayment_amount,
                status: TransactionStatus::Completed,
                listing_id: Some(purchase.listing_id),
                purchase_id: Some(purchase_id),
                remark: Some(format!("Repayment for listing: {}", listing.title)),
                proof: None,
                payout_account: None,
            },
            now,
        )?;

        // Referral commission on the proceeds, when configured
        let rate = self.ledger.referral_commission_rate;
        if rate > Decimal::ZERO {
            let referrer = inner
                .users
                .get(&purchase.payee_id)
                .and_then(|u| u.referrer_id);
            if let Some(referrer_id) = referrer {
                inner.apply_entry(
                    LedgerEntry {
                        user_id: referrer_id,
                        tx_type: TransactionType::ReferralCommission,
                        amount: purchase.repayment_amount * rate,
                        status: TransactionStatus::Completed,
                        listing_id: Some(purchase.listing_id),
                        purchase_id: Some(purchase_id),
                        remark: Some("Referral commission".into()),
                        proof: None,
                        payout_account: None,
                    },
                    now,
                )?;
            }
        }

        let stored = inner
            .purchases
            .get_mut(&purchase_id)
            .ok_or_else(|| AppError::NotFound(format!("Purchase {} not found", purchase_id)))?;
        stored.settled = true;
        stored.settled_at = Some(now);
        stored.needs_review = false;
        let settled = stored.clone();

        let listing = inner
            .listings
            .get_mut(&purchase.listing_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Listing {} not found", purchase.listing_id))
            })?;
        listing.status = crate::models::ListingStatus::Offline;
        listing.updated_at = now;

        Ok(RepaymentOutcome::Applied {
            purchase: settled,
            transaction,
        })
    }

    pub async fn find_by_id(&self, purchase_id: Uuid) -> AppResult<Option<Purchase>> {
        let inner = self.store.read().await;
        Ok(inner.purchases.get(&purchase_id).cloned())
    }

    /// The unsettled purchase on a listing, if any
    pub async fn find_active_by_listing(&self, listing_id: Uuid) -> AppResult<Option<Purchase>> {
        let inner = self.store.read().await;
        Ok(inner.active_purchase_for(listing_id).cloned())
    }

    /// Purchases past their repayment deadline and eligible for automatic
    /// repayment (not settled, not flagged for manual intervention)
    pub async fn find_due(&self, now: NaiveDateTime) -> AppResult<Vec<Purchase>> {
        let inner = self.store.read().await;
        let mut due: Vec<Purchase> = inner
            .purchases
            .values()
            .filter(|p| !p.settled && !p.needs_review && p.expiry_time <= now)
            .filter(|p| {
                inner
                    .listings
                    .get(&p.listing_id)
                    .map_or(true, |l| !l.is_offline())
            })
            .cloned()
            .collect();
        due.sort_by_key(|p| p.expiry_time);
        Ok(due)
    }

    /// All unsettled purchases, oldest deadline first
    pub async fn find_unsettled(&self) -> AppResult<Vec<Purchase>> {
        let inner = self.store.read().await;
        let mut open: Vec<Purchase> = inner
            .purchases
            .values()
            .filter(|p| !p.settled)
            .cloned()
            .collect();
        open.sort_by_key(|p| p.expiry_time);
        Ok(open)
    }

    /// Full purchase history of a listing, newest first
    pub async fn find_by_listing(&self, listing_id: Uuid) -> AppResult<Vec<Purchase>> {
        let inner = self.store.read().await;
        let mut history: Vec<Purchase> = inner
            .purchases
            .values()
            .filter(|p| p.listing_id == listing_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.purchase_time.cmp(&a.purchase_time));
        Ok(history)
    }

    pub async fn find_by_buyer(&self, buyer_id: Uuid) -> AppResult<Vec<Purchase>> {
        let inner = self.store.read().await;
        let mut history: Vec<Purchase> = inner
            .purchases
            .values()
            .filter(|p| p.buyer_id == buyer_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.purchase_time.cmp(&a.purchase_time));
        Ok(history)
    }

    /// Flag a purchase for manual operator intervention
    pub async fn flag_for_review(&self, purchase_id: Uuid) -> AppResult<Purchase> {
        let mut inner = self.store.write().await;
        let purchase = inner
            .purchases
            .get_mut(&purchase_id)
            .ok_or_else(|| AppError::NotFound(format!("Purchase {} not found", purchase_id)))?;
        purchase.needs_review = true;
        Ok(purchase.clone())
    }
}
