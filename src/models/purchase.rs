use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proximity of a purchase to its repayment deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryState {
    /// Well before the deadline
    Active,
    /// Inside the warning lead window of the deadline
    Warning,
    /// Past the deadline and not yet settled
    Critical,
}

/// Purchase model representing one buy event on a listing
///
/// Amounts and period are snapshotted from the listing at purchase time so
/// that later edits to a re-published listing never change an open loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub listing_id: Uuid,
    pub buyer_id: Uuid,
    /// Proceeds recipient for the repayment, fixed at purchase time
    pub payee_id: Uuid,
    pub loan_amount: Decimal,
    pub repayment_amount: Decimal,
    pub period_days: u32,
    pub purchase_time: NaiveDateTime,
    /// purchase_time + period_days, immutable once computed
    pub expiry_time: NaiveDateTime,
    pub settled: bool,
    pub settled_at: Option<NaiveDateTime>,
    /// Set when automatic repayment ran out of retries; cleared by settling
    pub needs_review: bool,
}

impl Purchase {
    /// Create a new Purchase with the expiry derived from the period
    pub fn new(
        listing_id: Uuid,
        buyer_id: Uuid,
        payee_id: Uuid,
        loan_amount: Decimal,
        repayment_amount: Decimal,
        period_days: u32,
        purchase_time: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            listing_id,
            buyer_id,
            payee_id,
            loan_amount,
            repayment_amount,
            period_days,
            purchase_time,
            expiry_time: purchase_time + Duration::days(i64::from(period_days)),
            settled: false,
            settled_at: None,
            needs_review: false,
        }
    }

    /// Milliseconds until the repayment deadline, clamped at zero
    pub fn remaining_ms(&self, now: NaiveDateTime) -> i64 {
        (self.expiry_time - now).num_milliseconds().max(0)
    }

    /// Whether the repayment deadline has passed
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        !self.settled && self.expiry_time <= now
    }

    /// Classify proximity to the deadline for operator dashboards
    pub fn expiry_state(&self, now: NaiveDateTime, warning_lead: Duration) -> ExpiryState {
        if self.settled {
            return ExpiryState::Active;
        }
        if self.expiry_time <= now {
            ExpiryState::Critical
        } else if self.expiry_time - now <= warning_lead {
            ExpiryState::Warning
        } else {
            ExpiryState::Active
        }
    }
}
