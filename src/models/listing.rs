use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Draft,
    Published,
    Offline,
}

impl ListingStatus {
    /// Parse a boundary string; legacy casing is normalized here, not stored
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ListingStatus::Draft),
            "published" => Ok(ListingStatus::Published),
            "offline" => Ok(ListingStatus::Offline),
            _ => Err(format!("Invalid listing status: {}", s)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Draft => "draft",
            ListingStatus::Published => "published",
            ListingStatus::Offline => "offline",
        }
    }
}

impl From<ListingStatus> for String {
    fn from(status: ListingStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Input for creating a listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewListing {
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    pub loan_amount: Decimal,
    pub repayment_amount: Decimal,
    pub period_days: u32,
    pub publish: bool,
    pub images: Vec<String>,
}

/// Listing model representing one short-term loan offer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub body: String,
    /// Principal the buyer pays to purchase the listing
    pub loan_amount: Decimal,
    /// Agreed amount expected back after the holding period
    pub repayment_amount: Decimal,
    /// Holding period in days
    pub period_days: u32,
    pub status: ListingStatus,
    /// Pinned flag for the admin listing board
    pub is_top: bool,
    pub images: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Listing {
    /// Create a new Listing from validated input
    pub fn new(input: NewListing) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4(),
            author_id: input.author_id,
            title: input.title,
            body: input.body,
            loan_amount: input.loan_amount,
            repayment_amount: input.repayment_amount,
            period_days: input.period_days,
            status: if input.publish {
                ListingStatus::Published
            } else {
                ListingStatus::Draft
            },
            is_top: false,
            images: input.images,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == ListingStatus::Published
    }

    pub fn is_offline(&self) -> bool {
        self.status == ListingStatus::Offline
    }

    /// Validate the loan terms for the target status
    pub fn validate_terms(
        loan_amount: Decimal,
        repayment_amount: Decimal,
        period_days: u32,
        published: bool,
    ) -> Result<(), String> {
        if loan_amount <= Decimal::ZERO {
            return Err("Loan amount must be greater than zero".to_string());
        }
        if repayment_amount <= Decimal::ZERO {
            return Err("Repayment amount must be set when the loan amount is set".to_string());
        }
        if repayment_amount < loan_amount {
            return Err("Repayment amount must not be below the loan amount".to_string());
        }
        if published && period_days == 0 {
            return Err("Period must be a positive number of days for a published listing".to_string());
        }
        Ok(())
    }
}
