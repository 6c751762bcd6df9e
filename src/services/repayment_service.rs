use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus};
use crate::repositories::{ListingRepository, PurchaseRepository, RepaymentOutcome};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// The repayment primitive shared by the expiry scheduler and manual
/// operator actions: one code path regardless of trigger source.
pub struct RepaymentService {
    purchase_repo: Arc<PurchaseRepository>,
    listing_repo: Arc<ListingRepository>,
    events: Arc<EventBus>,
}

impl RepaymentService {
    pub fn new(
        purchase_repo: Arc<PurchaseRepository>,
        listing_repo: Arc<ListingRepository>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            purchase_repo,
            listing_repo,
            events,
        }
    }

    /// Settle one purchase: credit the payee with the repayment amount and
    /// take the listing offline. Idempotent - settling an already-settled
    /// purchase is a no-op.
    pub async fn settle_purchase(
        &self,
        purchase_id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<RepaymentOutcome> {
        let outcome = self.purchase_repo.settle_purchase(purchase_id, now).await?;

        if let RepaymentOutcome::Applied {
            purchase,
            transaction,
        } = &outcome
        {
            info!(
                "Repayment applied: purchase {} credited {} to payee {}",
                purchase.id, transaction.amount, purchase.payee_id
            );
            self.events.publish(DomainEvent::RepaymentApplied {
                listing_id: purchase.listing_id,
                purchase_id: purchase.id,
                payee_id: purchase.payee_id,
                amount: purchase.repayment_amount,
            });
        }

        Ok(outcome)
    }

    /// Manual repayment trigger addressed by listing. Idempotent on an
    /// already-offline listing.
    pub async fn settle_listing(
        &self,
        listing_id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<RepaymentOutcome> {
        if let Some(active) = self.purchase_repo.find_active_by_listing(listing_id).await? {
            return self.settle_purchase(active.id, now).await;
        }

        let listing = self
            .listing_repo
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;

        if listing.is_offline() {
            Ok(RepaymentOutcome::AlreadySettled)
        } else {
            Err(AppError::BusinessRule(
                "Listing has no active purchase to repay".into(),
            ))
        }
    }
}
