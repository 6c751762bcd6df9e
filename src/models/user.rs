use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User model representing a registered marketplace account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// User who invited this one; drives referral commission on repayment
    pub referrer_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
}

impl User {
    /// Create a new User (typically used for creating from API input)
    pub fn new(username: String, referrer_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            referrer_id,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
