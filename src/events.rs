use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// Domain events published for the external notification layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    #[serde(rename = "listing_purchased")]
    ListingPurchased {
        listing_id: Uuid,
        purchase_id: Uuid,
        buyer_id: Uuid,
        amount: Decimal,
    },
    #[serde(rename = "repayment_applied")]
    RepaymentApplied {
        listing_id: Uuid,
        purchase_id: Uuid,
        payee_id: Uuid,
        amount: Decimal,
    },
    #[serde(rename = "repayment_flagged")]
    RepaymentFlagged { purchase_id: Uuid, attempts: u32 },
    #[serde(rename = "review_decided")]
    ReviewDecided {
        transaction_id: Uuid,
        user_id: Uuid,
        approved: bool,
    },
}

/// Broadcast bus carrying domain events out of the core
///
/// The admin notification layer subscribes; the core never depends on a
/// subscriber being present.
pub struct EventBus {
    tx: broadcast::Sender<DomainEvent>,
}

impl EventBus {
    /// Create a new bus
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1000); // Buffer up to 1000 events
        Self { tx }
    }

    /// Publish an event to all current subscribers
    pub fn publish(&self, event: DomainEvent) {
        // Send only fails when nobody is subscribed, which is fine
        if self.tx.send(event).is_err() {
            debug!("Domain event published with no subscribers");
        }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
