use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Per-user wallet tracking total balance and the frozen share of it
///
/// `balance` includes frozen funds; what a user can actually spend is
/// `available()`. Created with zero balance at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub frozen: Decimal,
    pub payment_password_hash: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Wallet {
    /// Create a zero-balance wallet for a freshly registered user
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            balance: Decimal::ZERO,
            frozen: Decimal::ZERO,
            payment_password_hash: None,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Get available balance (total - frozen)
    pub fn available(&self) -> Decimal {
        self.balance - self.frozen
    }

    pub fn has_payment_password(&self) -> bool {
        self.payment_password_hash.is_some()
    }

    /// Digest a payment password for storage or comparison
    pub fn hash_payment_password(password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Check a candidate password against the stored digest
    ///
    /// Returns true when no password has been set.
    pub fn verify_payment_password(&self, password: &str) -> bool {
        match &self.payment_password_hash {
            Some(stored) => *stored == Self::hash_payment_password(password),
            None => true,
        }
    }
}
