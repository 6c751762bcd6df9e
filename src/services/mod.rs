pub mod audit_service;
pub mod purchase_service;
pub mod repayment_service;
pub mod scheduler;

// Re-export all services for convenient access
pub use audit_service::AuditService;
pub use purchase_service::PurchaseService;
pub use repayment_service::RepaymentService;
pub use scheduler::{ExpiryScheduler, ScanSummary};
