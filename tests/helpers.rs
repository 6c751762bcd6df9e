use chrono::{Duration, NaiveDateTime};
use loanboard_backend::config::{AppConfig, LedgerConfig, SchedulerConfig};
use loanboard_backend::models::*;
use loanboard_backend::services::*;
use loanboard_backend::AppState;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Fully wired application for tests: state, services, and the scheduler
pub struct TestApp {
    pub state: Arc<AppState>,
    pub purchase: Arc<PurchaseService>,
    pub repayment: Arc<RepaymentService>,
    pub audit: Arc<AuditService>,
    pub scheduler: Arc<ExpiryScheduler>,
    pub config: AppConfig,
}

impl TestApp {
    /// Create a TestApp with default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a TestApp with a short retry budget for scheduler tests
    pub fn with_scheduler(scheduler: SchedulerConfig) -> Self {
        Self::with_config(AppConfig {
            scheduler,
            ..AppConfig::default()
        })
    }

    /// Create a TestApp with custom ledger routing
    pub fn with_ledger(ledger: LedgerConfig) -> Self {
        Self::with_config(AppConfig {
            ledger,
            ..AppConfig::default()
        })
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = Arc::new(AppState::new(&config));

        let purchase = Arc::new(PurchaseService::new(
            state.purchase_repo.clone(),
            state.events.clone(),
        ));
        let repayment = Arc::new(RepaymentService::new(
            state.purchase_repo.clone(),
            state.listing_repo.clone(),
            state.events.clone(),
        ));
        let audit = Arc::new(AuditService::new(
            state.wallet_repo.clone(),
            state.events.clone(),
        ));
        let scheduler = Arc::new(ExpiryScheduler::new(
            state.purchase_repo.clone(),
            repayment.clone(),
            state.events.clone(),
            config.scheduler.clone(),
        ));

        Self {
            state,
            purchase,
            repayment,
            audit,
            scheduler,
            config,
        }
    }

    /// Verify the conservation property for one user: the wallet balance
    /// equals the sum of terminal ledger amounts, and nothing is negative
    pub async fn assert_conserved(&self, user_id: Uuid) {
        let inner = self.state.store.read().await;
        let wallet = inner.wallets.get(&user_id).expect("wallet missing");
        let ledger_sum: Decimal = inner
            .transactions
            .values()
            .filter(|t| t.user_id == user_id && t.status == TransactionStatus::Completed)
            .map(|t| t.amount)
            .sum();
        assert_eq!(
            wallet.balance, ledger_sum,
            "balance must equal the sum of terminal ledger amounts"
        );
        assert!(wallet.balance >= Decimal::ZERO, "balance must not go negative");
        assert!(wallet.frozen >= Decimal::ZERO, "frozen must not go negative");
        assert!(
            wallet.frozen <= wallet.balance,
            "frozen must not exceed the balance"
        );
    }
}

/// Current UTC timestamp
pub fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

/// A timestamp `days` before now
pub fn days_ago(days: i64) -> NaiveDateTime {
    now() - Duration::days(days)
}

/// Shorthand for whole-number decimals
pub fn dec(value: i64) -> Decimal {
    Decimal::new(value, 0)
}

/// Helper function to create a test user
pub async fn create_test_user(app: &TestApp, username: &str) -> User {
    app.state
        .user_repo
        .create(username, None)
        .await
        .expect("Failed to create test user")
}

/// Helper function to create a test user with a referrer
pub async fn create_referred_user(app: &TestApp, username: &str, referrer: Uuid) -> User {
    app.state
        .user_repo
        .create(username, Some(referrer))
        .await
        .expect("Failed to create referred user")
}

/// Helper function to credit a wallet with completed funds
pub async fn fund_wallet(app: &TestApp, user_id: Uuid, amount: Decimal) {
    app.state
        .wallet_repo
        .apply_completed(
            user_id,
            TransactionType::Recharge,
            amount,
            Some("Test funding".to_string()),
            now(),
        )
        .await
        .expect("Failed to fund wallet");
}

/// Helper function to create a published test listing
pub async fn create_test_listing(
    app: &TestApp,
    author_id: Uuid,
    loan: Decimal,
    repayment: Decimal,
    period_days: u32,
) -> Listing {
    app.state
        .listing_repo
        .create(NewListing {
            author_id,
            title: format!("Loan offer {}", loan),
            body: "Short-term loan offer".to_string(),
            loan_amount: loan,
            repayment_amount: repayment,
            period_days,
            publish: true,
            images: vec![],
        })
        .await
        .expect("Failed to create test listing")
}

/// A buyer and a published listing, with the buyer funded to exactly cover
/// the principal
pub async fn setup_purchase_pair(
    app: &TestApp,
    loan: Decimal,
    repayment: Decimal,
    period_days: u32,
) -> (User, Listing) {
    let author = create_test_user(app, &format!("author_{}", Uuid::new_v4())).await;
    let buyer = create_test_user(app, &format!("buyer_{}", Uuid::new_v4())).await;
    fund_wallet(app, buyer.id, loan).await;
    let listing = create_test_listing(app, author.id, loan, repayment, period_days).await;
    (buyer, listing)
}
