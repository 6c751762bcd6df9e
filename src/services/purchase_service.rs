use crate::error::AppResult;
use crate::events::{DomainEvent, EventBus};
use crate::models::{Purchase, Transaction};
use crate::repositories::PurchaseRepository;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service executing the atomic "buy a listing" operation
pub struct PurchaseService {
    purchase_repo: Arc<PurchaseRepository>,
    events: Arc<EventBus>,
}

impl PurchaseService {
    pub fn new(purchase_repo: Arc<PurchaseRepository>, events: Arc<EventBus>) -> Self {
        Self {
            purchase_repo,
            events,
        }
    }

    /// Purchase a listing at the current time
    pub async fn purchase(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
    ) -> AppResult<(Purchase, Transaction)> {
        self.purchase_at(listing_id, buyer_id, chrono::Utc::now().naive_utc())
            .await
    }

    /// Purchase a listing with an explicit clock
    ///
    /// All preconditions (published, no active purchase, not self-authored,
    /// sufficient balance) are checked inside the repository's atomic unit.
    pub async fn purchase_at(
        &self,
        listing_id: Uuid,
        buyer_id: Uuid,
        now: NaiveDateTime,
    ) -> AppResult<(Purchase, Transaction)> {
        info!("Purchasing listing {} for buyer {}", listing_id, buyer_id);

        let (purchase, transaction) = self
            .purchase_repo
            .create_purchase(listing_id, buyer_id, now)
            .await?;

        self.events.publish(DomainEvent::ListingPurchased {
            listing_id,
            purchase_id: purchase.id,
            buyer_id,
            amount: purchase.loan_amount,
        });

        info!(
            "Listing {} purchased: purchase {} expires {}",
            listing_id, purchase.id, purchase.expiry_time
        );

        Ok((purchase, transaction))
    }
}
