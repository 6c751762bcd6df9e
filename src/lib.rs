//! Loanboard Backend Library
//!
//! This module exposes the backend components for use by tests and other
//! consumers.

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use events::EventBus;
use repositories::*;
use std::sync::Arc;
use store::Store;

/// Application state containing the shared store and all repositories
pub struct AppState {
    pub store: Store,
    pub user_repo: Arc<UserRepository>,
    pub listing_repo: Arc<ListingRepository>,
    pub purchase_repo: Arc<PurchaseRepository>,
    pub wallet_repo: Arc<WalletRepository>,
    pub events: Arc<EventBus>,
}

impl AppState {
    /// Create a new AppState with initialized repositories
    pub fn new(config: &AppConfig) -> Self {
        let store = Store::new();

        Self {
            store: store.clone(),
            user_repo: Arc::new(UserRepository::new(store.clone())),
            listing_repo: Arc::new(ListingRepository::new(store.clone())),
            purchase_repo: Arc::new(PurchaseRepository::new(
                store.clone(),
                config.ledger.clone(),
            )),
            wallet_repo: Arc::new(WalletRepository::new(store)),
            events: Arc::new(EventBus::new()),
        }
    }
}
