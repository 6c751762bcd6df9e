use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus};
use crate::models::{ReviewDecision, Transaction};
use crate::repositories::WalletRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Service managing the manual recharge/withdraw audit workflow
pub struct AuditService {
    wallet_repo: Arc<WalletRepository>,
    events: Arc<EventBus>,
}

impl AuditService {
    pub fn new(wallet_repo: Arc<WalletRepository>, events: Arc<EventBus>) -> Self {
        Self {
            wallet_repo,
            events,
        }
    }

    /// Submit a recharge request with a proof-of-payment reference
    pub async fn submit_recharge(
        &self,
        user_id: Uuid,
        amount: Decimal,
        proof: Option<String>,
    ) -> AppResult<Transaction> {
        let now = chrono::Utc::now().naive_utc();
        let transaction = self
            .wallet_repo
            .submit_recharge(user_id, amount, proof, now)
            .await?;
        info!(
            "Recharge request {} submitted by user {} for {}",
            transaction.id, user_id, amount
        );
        Ok(transaction)
    }

    /// Submit a withdraw request; the amount is reserved from the available
    /// balance until the operator decides
    pub async fn submit_withdraw(
        &self,
        user_id: Uuid,
        amount: Decimal,
        payout_account: String,
        payment_password: Option<&str>,
    ) -> AppResult<Transaction> {
        let wallet = self
            .wallet_repo
            .get_wallet(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Wallet for user {} not found", user_id)))?;

        if wallet.has_payment_password() {
            let candidate = payment_password
                .ok_or_else(|| AppError::Unauthorized("Payment password required".into()))?;
            if !wallet.verify_payment_password(candidate) {
                return Err(AppError::Unauthorized("Payment password mismatch".into()));
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let transaction = self
            .wallet_repo
            .submit_withdraw(user_id, amount, payout_account, now)
            .await?;
        info!(
            "Withdraw request {} submitted by user {} for {}",
            transaction.id, user_id, amount
        );
        Ok(transaction)
    }

    /// Apply an operator decision to a pending request
    pub async fn review(
        &self,
        transaction_id: Uuid,
        decision: ReviewDecision,
        operator_id: Uuid,
        remark: Option<String>,
    ) -> AppResult<Transaction> {
        let now = chrono::Utc::now().naive_utc();
        let transaction = self
            .wallet_repo
            .apply_review(transaction_id, decision, operator_id, remark, now)
            .await?;

        info!(
            "Transaction {} reviewed by {}: {}",
            transaction_id,
            operator_id,
            transaction.status.as_str()
        );
        self.events.publish(DomainEvent::ReviewDecided {
            transaction_id,
            user_id: transaction.user_id,
            approved: decision == ReviewDecision::Approve,
        });

        Ok(transaction)
    }

    /// Pending requests for the operator queue, oldest first
    pub async fn pending_reviews(&self) -> AppResult<Vec<Transaction>> {
        self.wallet_repo.pending_reviews().await
    }
}
