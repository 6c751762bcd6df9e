//! Loanboard Backend Service
//!
//! Main entry point for the Loanboard back office.
//! This service provides:
//! - The listing lifecycle and wallet ledger engine
//! - A background expiry scheduler for automatic repayments
//! - A domain event stream consumed by the admin notification layer

use loanboard_backend::config::AppConfig;
use loanboard_backend::error::{AppError, AppResult};
use loanboard_backend::services::{AuditService, ExpiryScheduler, PurchaseService, RepaymentService};
use loanboard_backend::AppState;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    // Initialize tracing/logging with config
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("loanboard_backend={}", config.log_level).into()),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Loanboard Backend Service Starting              ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("Scheduler interval: {}s", config.scheduler.scan_interval_secs);

    // =========================================================================
    // CORE SERVICES INITIALIZATION
    // =========================================================================
    info!("Initializing core services...");

    let app_state = Arc::new(AppState::new(&config));
    info!("✓ Application state initialized with repositories");

    let _purchase_service = Arc::new(PurchaseService::new(
        app_state.purchase_repo.clone(),
        app_state.events.clone(),
    ));
    info!("✓ Purchase engine initialized");

    let repayment_service = Arc::new(RepaymentService::new(
        app_state.purchase_repo.clone(),
        app_state.listing_repo.clone(),
        app_state.events.clone(),
    ));
    info!("✓ Repayment service initialized");

    let _audit_service = Arc::new(AuditService::new(
        app_state.wallet_repo.clone(),
        app_state.events.clone(),
    ));
    info!("✓ Audit workflow initialized");

    // =========================================================================
    // BACKGROUND TASKS
    // =========================================================================
    info!("Starting background tasks...");

    let scheduler = Arc::new(ExpiryScheduler::new(
        app_state.purchase_repo.clone(),
        repayment_service.clone(),
        app_state.events.clone(),
        config.scheduler.clone(),
    ));

    let scheduler_handle = tokio::spawn({
        let scheduler = scheduler.clone();
        async move {
            scheduler.start().await;
        }
    });
    info!(
        "✓ Expiry scheduler background task started ({}s interval)",
        config.scheduler.scan_interval_secs
    );

    // Drain domain events for the (external) notification layer
    let mut event_rx = app_state.events.subscribe();
    let notifier_handle = tokio::spawn(async move {
        loop {
            match event_rx.recv().await {
                Ok(event) => info!("Domain event: {:?}", event),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    error!("Notification consumer lagged, {} events dropped", missed);
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });
    info!("✓ Notification consumer started");

    // =========================================================================
    // READY
    // =========================================================================
    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║           Loanboard Backend Service Ready!                ║");
    info!("╚══════════════════════════════════════════════════════════╝");
    info!("Press Ctrl+C to shutdown gracefully");

    // =========================================================================
    // SHUTDOWN HANDLING
    // =========================================================================
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down gracefully...");
        }
        _ = scheduler_handle => {
            error!("Expiry scheduler task exited unexpectedly");
        }
        _ = notifier_handle => {
            error!("Notification consumer exited unexpectedly");
        }
    }

    info!("Loanboard backend service shutdown complete");
    Ok(())
}
