//! Domain models for the Loanboard backend.
//!
//! This module contains all persisted models representing the core entities
//! of the loan-listing marketplace.

pub mod listing;
pub mod purchase;
pub mod stats;
pub mod transaction;
pub mod user;
pub mod wallet;

// Re-export all models for convenient access
pub use listing::{Listing, ListingStatus, NewListing};
pub use purchase::{ExpiryState, Purchase};
pub use stats::{AutoRepaymentStats, SchedulerErrorRecord};
pub use transaction::{
    PeriodStat, ReviewDecision, Transaction, TransactionFilter, TransactionStatus,
    TransactionType, WalletStatistics,
};
pub use user::User;
pub use wallet::Wallet;
