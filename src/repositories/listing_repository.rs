//! Repository for listing lifecycle operations

use crate::error::{AppError, AppResult};
use crate::models::{Listing, ListingStatus, NewListing};
use crate::store::Store;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Filters for the admin listing board
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub status: Option<ListingStatus>,
    pub author_id: Option<Uuid>,
    pub limit: Option<usize>,
}

/// Partial update of listing content and terms
#[derive(Debug, Clone, Default)]
pub struct UpdateListing {
    pub title: Option<String>,
    pub body: Option<String>,
    pub images: Option<Vec<String>>,
    pub loan_amount: Option<Decimal>,
    pub repayment_amount: Option<Decimal>,
    pub period_days: Option<u32>,
}

pub struct ListingRepository {
    store: Store,
}

impl ListingRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a listing as draft or published
    pub async fn create(&self, input: NewListing) -> AppResult<Listing> {
        if input.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".into()));
        }
        Listing::validate_terms(
            input.loan_amount,
            input.repayment_amount,
            input.period_days,
            input.publish,
        )
        .map_err(AppError::Validation)?;

        let mut inner = self.store.write().await;
        if !inner.users.contains_key(&input.author_id) {
            return Err(AppError::NotFound(format!(
                "Author {} not found",
                input.author_id
            )));
        }

        let listing = Listing::new(input);
        inner.listings.insert(listing.id, listing.clone());
        Ok(listing)
    }

    pub async fn find_by_id(&self, listing_id: Uuid) -> AppResult<Option<Listing>> {
        let inner = self.store.read().await;
        Ok(inner.listings.get(&listing_id).cloned())
    }

    /// List listings for the admin board, pinned first then newest first
    pub async fn list(&self, query: ListingQuery) -> AppResult<Vec<Listing>> {
        let inner = self.store.read().await;
        let mut listings: Vec<Listing> = inner
            .listings
            .values()
            .filter(|l| query.status.map_or(true, |s| l.status == s))
            .filter(|l| query.author_id.map_or(true, |a| l.author_id == a))
            .cloned()
            .collect();
        listings.sort_by(|a, b| {
            b.is_top
                .cmp(&a.is_top)
                .then(b.created_at.cmp(&a.created_at))
        });
        if let Some(limit) = query.limit {
            listings.truncate(limit);
        }
        Ok(listings)
    }

    /// Update content and terms; rejected while a purchase is open
    pub async fn update(&self, listing_id: Uuid, update: UpdateListing) -> AppResult<Listing> {
        let mut inner = self.store.write().await;

        if inner.active_purchase_for(listing_id).is_some() {
            return Err(AppError::BusinessRule(
                "Listing has an active purchase and cannot be edited".into(),
            ));
        }

        let listing = inner
            .listings
            .get(&listing_id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;

        let loan_amount = update.loan_amount.unwrap_or(listing.loan_amount);
        let repayment_amount = update.repayment_amount.unwrap_or(listing.repayment_amount);
        let period_days = update.period_days.unwrap_or(listing.period_days);
        Listing::validate_terms(
            loan_amount,
            repayment_amount,
            period_days,
            listing.is_published(),
        )
        .map_err(AppError::Validation)?;

        let listing = inner
            .listings
            .get_mut(&listing_id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;
        if let Some(title) = update.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title must not be empty".into()));
            }
            listing.title = title;
        }
        if let Some(body) = update.body {
            listing.body = body;
        }
        if let Some(images) = update.images {
            listing.images = images;
        }
        listing.loan_amount = loan_amount;
        listing.repayment_amount = repayment_amount;
        listing.period_days = period_days;
        listing.updated_at = chrono::Utc::now().naive_utc();

        Ok(listing.clone())
    }

    /// Publish a draft listing
    pub async fn publish(&self, listing_id: Uuid) -> AppResult<Listing> {
        self.transition(listing_id, ListingStatus::Draft, ListingStatus::Published)
            .await
    }

    /// Put a settled listing back on the board; history stays many-to-one
    pub async fn republish(&self, listing_id: Uuid) -> AppResult<Listing> {
        self.transition(listing_id, ListingStatus::Offline, ListingStatus::Published)
            .await
    }

    /// Administrative withdrawal of an unpurchased listing
    pub async fn take_offline(&self, listing_id: Uuid) -> AppResult<Listing> {
        let mut inner = self.store.write().await;

        if inner.active_purchase_for(listing_id).is_some() {
            return Err(AppError::BusinessRule(
                "Listing has an active purchase and cannot be withdrawn".into(),
            ));
        }

        let listing = inner
            .listings
            .get_mut(&listing_id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;
        listing.status = ListingStatus::Offline;
        listing.updated_at = chrono::Utc::now().naive_utc();
        Ok(listing.clone())
    }

    /// Toggle the pinned flag
    pub async fn set_top(&self, listing_id: Uuid, is_top: bool) -> AppResult<Listing> {
        let mut inner = self.store.write().await;
        let listing = inner
            .listings
            .get_mut(&listing_id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;
        listing.is_top = is_top;
        listing.updated_at = chrono::Utc::now().naive_utc();
        Ok(listing.clone())
    }

    /// Delete a listing that is unpurchased or fully settled
    pub async fn delete(&self, listing_id: Uuid) -> AppResult<()> {
        let mut inner = self.store.write().await;

        if !inner.listings.contains_key(&listing_id) {
            return Err(AppError::NotFound(format!("Listing {} not found", listing_id)));
        }
        if inner.active_purchase_for(listing_id).is_some() {
            return Err(AppError::BusinessRule(
                "Listing has an active purchase and cannot be deleted".into(),
            ));
        }

        inner.listings.remove(&listing_id);
        Ok(())
    }

    async fn transition(
        &self,
        listing_id: Uuid,
        from: ListingStatus,
        to: ListingStatus,
    ) -> AppResult<Listing> {
        let mut inner = self.store.write().await;

        if to == ListingStatus::Published && inner.active_purchase_for(listing_id).is_some() {
            return Err(AppError::BusinessRule(
                "Listing has an active purchase and cannot be published".into(),
            ));
        }

        let listing = inner
            .listings
            .get_mut(&listing_id)
            .ok_or_else(|| AppError::NotFound(format!("Listing {} not found", listing_id)))?;

        if listing.status != from {
            return Err(AppError::BusinessRule(format!(
                "Listing is {}, expected {}",
                listing.status.as_str(),
                from.as_str()
            )));
        }
        if to == ListingStatus::Published {
            Listing::validate_terms(
                listing.loan_amount,
                listing.repayment_amount,
                listing.period_days,
                true,
            )
            .map_err(AppError::Validation)?;
        }

        listing.status = to;
        listing.updated_at = chrono::Utc::now().naive_utc();
        Ok(listing.clone())
    }
}
