mod helpers;

use chrono::Duration;
use helpers::*;
use loanboard_backend::error::AppError;
use loanboard_backend::models::*;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Unit tests for status enums

#[test]
fn test_listing_status_conversion() {
    assert_eq!(ListingStatus::Draft.as_str(), "draft");
    assert_eq!(ListingStatus::Published.as_str(), "published");
    assert_eq!(ListingStatus::Offline.as_str(), "offline");

    assert_eq!(ListingStatus::from_str("published"), Ok(ListingStatus::Published));
    assert!(ListingStatus::from_str("archived").is_err());
}

#[test]
fn test_listing_status_normalizes_legacy_casing() {
    assert_eq!(ListingStatus::from_str("PUBLISHED"), Ok(ListingStatus::Published));
    assert_eq!(ListingStatus::from_str("Offline"), Ok(ListingStatus::Offline));
    assert_eq!(ListingStatus::from_str("DRAFT"), Ok(ListingStatus::Draft));
}

#[test]
fn test_transaction_type_conversion() {
    assert_eq!(TransactionType::Recharge.as_str(), "recharge");
    assert_eq!(TransactionType::from_str("withdraw"), Some(TransactionType::Withdraw));
    assert_eq!(
        TransactionType::from_str("REFERRAL_COMMISSION"),
        Some(TransactionType::ReferralCommission)
    );
    assert_eq!(
        TransactionType::from_str("SALE_PROCEEDS"),
        Some(TransactionType::SaleProceeds)
    );
    assert_eq!(TransactionType::from_str("barter"), None);
}

#[test]
fn test_transaction_status_normalizes_legacy_synonyms() {
    assert_eq!(
        TransactionStatus::from_str("COMPLETED"),
        Some(TransactionStatus::Completed)
    );
    assert_eq!(
        TransactionStatus::from_str("approved"),
        Some(TransactionStatus::Completed)
    );
    assert_eq!(
        TransactionStatus::from_str("failed"),
        Some(TransactionStatus::Rejected)
    );
    assert_eq!(
        TransactionStatus::from_str("Cancelled"),
        Some(TransactionStatus::Cancelled)
    );
    assert_eq!(TransactionStatus::from_str("reverted"), None);
}

#[test]
fn test_transaction_status_terminality() {
    assert!(!TransactionStatus::Pending.is_terminal());
    assert!(TransactionStatus::Completed.is_terminal());
    assert!(TransactionStatus::Rejected.is_terminal());
    assert!(TransactionStatus::Cancelled.is_terminal());
}

/// Unit tests for expiry arithmetic

#[test]
fn test_expiry_time_is_exactly_period_days_after_purchase() {
    let t = now();
    let purchase = Purchase::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        dec(1000),
        dec(1200),
        15,
        t,
    );

    let expected_ms: i64 = 15 * 86_400_000;
    assert_eq!((purchase.expiry_time - t).num_milliseconds(), expected_ms);
}

#[test]
fn test_remaining_ms_clamps_at_zero() {
    let t = now();
    let purchase = Purchase::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        dec(100),
        dec(110),
        1,
        t,
    );

    assert_eq!(purchase.remaining_ms(t), 86_400_000);
    assert_eq!(purchase.remaining_ms(t + Duration::days(2)), 0);
}

#[test]
fn test_expiry_state_classification() {
    let t = now();
    let lead = Duration::hours(24);
    let purchase = Purchase::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        dec(100),
        dec(110),
        10,
        t,
    );

    assert_eq!(purchase.expiry_state(t, lead), ExpiryState::Active);
    assert_eq!(
        purchase.expiry_state(t + Duration::days(9) + Duration::hours(1), lead),
        ExpiryState::Warning
    );
    assert_eq!(
        purchase.expiry_state(t + Duration::days(10) + Duration::seconds(1), lead),
        ExpiryState::Critical
    );

    let mut settled = purchase;
    settled.settled = true;
    assert_eq!(
        settled.expiry_state(t + Duration::days(11), lead),
        ExpiryState::Active
    );
}

/// Unit tests for listing term validation

#[test]
fn test_listing_terms_validation() {
    assert!(Listing::validate_terms(dec(1000), dec(1200), 15, true).is_ok());
    assert!(Listing::validate_terms(dec(0), dec(1200), 15, true).is_err());
    assert!(Listing::validate_terms(dec(1000), dec(0), 15, true).is_err());
    assert!(Listing::validate_terms(dec(1000), dec(900), 15, true).is_err());
    // Zero period only matters once the listing is published
    assert!(Listing::validate_terms(dec(1000), dec(1200), 0, true).is_err());
    assert!(Listing::validate_terms(dec(1000), dec(1200), 0, false).is_ok());
}

/// Unit tests for wallets

#[test]
fn test_wallet_available_balance() {
    let mut wallet = Wallet::new(Uuid::new_v4());
    wallet.balance = dec(500);
    wallet.frozen = dec(200);
    assert_eq!(wallet.available(), dec(300));
}

#[test]
fn test_payment_password_digest() {
    let mut wallet = Wallet::new(Uuid::new_v4());
    assert!(!wallet.has_payment_password());
    // No password set means any candidate passes
    assert!(wallet.verify_payment_password("whatever"));

    wallet.payment_password_hash = Some(Wallet::hash_payment_password("secret123"));
    assert!(wallet.has_payment_password());
    assert!(wallet.verify_payment_password("secret123"));
    assert!(!wallet.verify_payment_password("secret124"));
}

/// Unit tests for scheduler stats

#[test]
fn test_stats_error_log_is_bounded() {
    let mut stats = AutoRepaymentStats::default();
    for i in 0..10 {
        stats.push_error(
            SchedulerErrorRecord {
                timestamp: now(),
                error: format!("error {}", i),
                context: "purchase test".to_string(),
            },
            3,
        );
    }
    assert_eq!(stats.recent_errors.len(), 3);
    assert_eq!(stats.recent_errors.front().unwrap().error, "error 7");
    assert_eq!(stats.recent_errors.back().unwrap().error, "error 9");
}

#[test]
fn test_stats_reset_clears_counters_and_errors() {
    let mut stats = AutoRepaymentStats::default();
    stats.total_scheduled = 4;
    stats.total_executed = 3;
    stats.total_failed = 2;
    stats.total_retries = 1;
    stats.push_error(
        SchedulerErrorRecord {
            timestamp: now(),
            error: "boom".to_string(),
            context: "purchase test".to_string(),
        },
        50,
    );
    stats.last_run = Some(now());

    stats.reset();
    assert_eq!(stats.total_scheduled, 0);
    assert_eq!(stats.total_executed, 0);
    assert_eq!(stats.total_failed, 0);
    assert_eq!(stats.total_retries, 0);
    assert!(stats.recent_errors.is_empty());
    // Operational timestamps survive a counter reset
    assert!(stats.last_run.is_some());
}

/// Unit tests for error handling

#[test]
fn test_error_status_codes() {
    assert_eq!(AppError::Validation("bad".into()).status_code(), 400);
    assert_eq!(
        AppError::InsufficientBalance {
            available: Decimal::ZERO,
            required: dec(10)
        }
        .status_code(),
        400
    );
    assert_eq!(AppError::SelfPurchaseForbidden.status_code(), 403);
    assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
    assert_eq!(AppError::ListingUnavailable("taken".into()).status_code(), 409);
    assert_eq!(AppError::AlreadyReviewed(Uuid::new_v4()).status_code(), 409);
    assert_eq!(AppError::SchedulerTransient("down".into()).status_code(), 503);
}

#[test]
fn test_error_retryability() {
    assert!(AppError::SchedulerTransient("down".into()).is_retryable());
    assert!(!AppError::Validation("bad".into()).is_retryable());
    assert!(!AppError::SelfPurchaseForbidden.is_retryable());
}
