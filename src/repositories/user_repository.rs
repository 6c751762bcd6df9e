//! Repository for user registration and lookup

use crate::error::{AppError, AppResult};
use crate::models::{User, Wallet};
use crate::store::Store;
use uuid::Uuid;

pub struct UserRepository {
    store: Store,
}

impl UserRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register a user and create their zero-balance wallet atomically
    pub async fn create(&self, username: &str, referrer_id: Option<Uuid>) -> AppResult<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::Validation("Username must not be empty".into()));
        }

        let mut inner = self.store.write().await;

        if inner.users.values().any(|u| u.username == username) {
            return Err(AppError::BusinessRule(format!(
                "Username already taken: {}",
                username
            )));
        }

        if let Some(referrer) = referrer_id {
            if !inner.users.contains_key(&referrer) {
                return Err(AppError::NotFound(format!("Referrer {} not found", referrer)));
            }
        }

        let user = User::new(username.to_string(), referrer_id);
        inner.users.insert(user.id, user.clone());
        inner.wallets.insert(user.id, Wallet::new(user.id));

        Ok(user)
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let inner = self.store.read().await;
        Ok(inner.users.get(&user_id).cloned())
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let inner = self.store.read().await;
        Ok(inner.users.values().find(|u| u.username == username).cloned())
    }
}
