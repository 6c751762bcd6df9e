use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation errors (malformed amount, period, username, ...)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Buyer wallet cannot cover the requested debit
    #[error("Insufficient balance: available {available}, required {required}")]
    InsufficientBalance {
        available: Decimal,
        required: Decimal,
    },

    /// Listing cannot be purchased (not published, or already purchased)
    #[error("Listing unavailable: {0}")]
    ListingUnavailable(String),

    /// Authors may not purchase their own listings
    #[error("Self-purchase is not allowed")]
    SelfPurchaseForbidden,

    /// Review attempted on a transaction that already reached a terminal status
    #[error("Transaction {0} has already been reviewed")]
    AlreadyReviewed(Uuid),

    /// Business rule violations (delete with active purchase, republish while purchased, ...)
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Unauthorized access errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transient scheduler failure, retried with backoff
    #[error("Scheduler transient error: {0}")]
    SchedulerTransient(String),

    /// Automatic repayment gave up after the configured retry budget
    #[error("Automatic repayment exhausted after {attempts} attempts for purchase {purchase_id}")]
    SchedulerExhausted { purchase_id: Uuid, attempts: u32 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// UUID parsing errors
    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Check if error may be retried by the scheduler
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::SchedulerTransient(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Validation(_)
            | AppError::InsufficientBalance { .. }
            | AppError::BusinessRule(_)
            | AppError::InvalidUuid(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::SelfPurchaseForbidden => 403,
            AppError::NotFound(_) => 404,
            AppError::ListingUnavailable(_) | AppError::AlreadyReviewed(_) => 409,
            AppError::Config(_) => 500,
            AppError::SchedulerTransient(_) | AppError::SchedulerExhausted { .. } => 503,
            _ => 500,
        }
    }
}

/// Convenience function to convert Option<T> to Result<T, AppError>
pub fn option_to_result<T>(opt: Option<T>, error_msg: &str) -> AppResult<T> {
    opt.ok_or_else(|| AppError::NotFound(error_msg.to_string()))
}
