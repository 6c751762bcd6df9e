pub mod listing_repository;
pub mod purchase_repository;
pub mod user_repository;
pub mod wallet_repository;

// Re-export all repositories for convenient access
pub use listing_repository::{ListingQuery, ListingRepository, UpdateListing};
pub use purchase_repository::{PurchaseRepository, RepaymentOutcome};
pub use user_repository::UserRepository;
pub use wallet_repository::WalletRepository;
