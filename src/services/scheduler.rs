//! Expiry scheduler: converts elapsed time into automatic repayment.
//!
//! A single background task scans purchased, unexpired listings on a fixed
//! interval. Scans never overlap: a tick arriving while a scan is still
//! running is skipped, not queued.

use crate::config::SchedulerConfig;
use crate::error::{AppError, AppResult};
use crate::events::{DomainEvent, EventBus};
use crate::models::{AutoRepaymentStats, ExpiryState, SchedulerErrorRecord};
use crate::repositories::PurchaseRepository;
use crate::services::RepaymentService;
use chrono::{Duration, NaiveDateTime};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outcome of one scan, for callers and tests
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// True when the tick was skipped because a scan was still running
    pub skipped: bool,
    pub due: usize,
    pub executed: usize,
    pub failed: usize,
    /// Due purchases waiting out their backoff window
    pub deferred: usize,
    /// Unsettled purchases inside the warning lead window
    pub warnings: usize,
}

#[derive(Debug)]
struct RetryState {
    /// Failed attempts so far, the initial one included
    attempts: u32,
    next_attempt: NaiveDateTime,
}

#[derive(Debug, Default)]
struct SchedulerState {
    /// Purchases already counted toward total_scheduled
    seen: HashSet<Uuid>,
    retries: HashMap<Uuid, RetryState>,
}

pub struct ExpiryScheduler {
    purchase_repo: Arc<PurchaseRepository>,
    repayment: Arc<RepaymentService>,
    events: Arc<EventBus>,
    config: SchedulerConfig,
    stats: RwLock<AutoRepaymentStats>,
    state: RwLock<SchedulerState>,
    scan_lock: Mutex<()>,
    started_at: Instant,
}

impl ExpiryScheduler {
    pub fn new(
        purchase_repo: Arc<PurchaseRepository>,
        repayment: Arc<RepaymentService>,
        events: Arc<EventBus>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            purchase_repo,
            repayment,
            events,
            config,
            stats: RwLock::new(AutoRepaymentStats::default()),
            state: RwLock::new(SchedulerState::default()),
            scan_lock: Mutex::new(()),
            started_at: Instant::now(),
        }
    }

    /// Start the recurring scan loop
    pub async fn start(self: Arc<Self>) {
        let mut interval = time::interval(self.config.scan_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            "Expiry scheduler started, scanning every {:?}",
            self.config.scan_interval()
        );

        loop {
            interval.tick().await;

            match self.scan_once(chrono::Utc::now().naive_utc()).await {
                Ok(summary) if summary.skipped => {
                    warn!("Previous scan still running, tick skipped");
                }
                Ok(summary) => {
                    if summary.due > 0 {
                        info!(
                            "Scan complete: {} due, {} executed, {} failed, {} deferred",
                            summary.due, summary.executed, summary.failed, summary.deferred
                        );
                    }
                }
                Err(e) => {
                    error!("Error scanning for due purchases: {}", e);
                }
            }
        }
    }

    /// Run one scan against an explicit clock.
    ///
    /// Each due purchase is attempted at most once per scan; purchases in a
    /// backoff window are deferred, and purchases past the retry budget are
    /// flagged for manual intervention and excluded from future scans.
    pub async fn scan_once(&self, now: NaiveDateTime) -> AppResult<ScanSummary> {
        let _guard = match self.scan_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                return Ok(ScanSummary {
                    skipped: true,
                    ..ScanSummary::default()
                })
            }
        };

        let mut summary = ScanSummary::default();

        let warning_lead = Duration::hours(self.config.warning_lead_hours);
        summary.warnings = self
            .purchase_repo
            .find_unsettled()
            .await?
            .iter()
            .filter(|p| p.expiry_state(now, warning_lead) == ExpiryState::Warning)
            .count();
        if summary.warnings > 0 {
            debug!("{} purchases approaching their repayment deadline", summary.warnings);
        }

        let due = self.purchase_repo.find_due(now).await?;
        summary.due = due.len();

        let mut state = self.state.write().await;
        for purchase in due {
            if state.seen.insert(purchase.id) {
                self.stats.write().await.total_scheduled += 1;
            }

            let mut attempts_so_far = 0;
            if let Some(retry) = state.retries.get(&purchase.id) {
                if now < retry.next_attempt {
                    summary.deferred += 1;
                    continue;
                }
                attempts_so_far = retry.attempts;
                self.stats.write().await.total_retries += 1;
            }

            match self.repayment.settle_purchase(purchase.id, now).await {
                Ok(outcome) => {
                    state.retries.remove(&purchase.id);
                    if outcome.is_applied() {
                        summary.executed += 1;
                        self.stats.write().await.total_executed += 1;
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    warn!("Automatic repayment failed for purchase {}: {}", purchase.id, e);

                    let attempts = attempts_so_far + 1;
                    let mut stats = self.stats.write().await;
                    stats.total_failed += 1;
                    stats.push_error(
                        SchedulerErrorRecord {
                            timestamp: now,
                            error: e.to_string(),
                            context: format!("purchase {}", purchase.id),
                        },
                        self.config.error_log_capacity,
                    );

                    if attempts > self.config.max_retries {
                        let exhausted = AppError::SchedulerExhausted {
                            purchase_id: purchase.id,
                            attempts,
                        };
                        stats.push_error(
                            SchedulerErrorRecord {
                                timestamp: now,
                                error: exhausted.to_string(),
                                context: format!("purchase {}", purchase.id),
                            },
                            self.config.error_log_capacity,
                        );
                        drop(stats);

                        error!(
                            "Purchase {} exhausted {} repayment attempts, flagging for operator",
                            purchase.id, attempts
                        );
                        state.retries.remove(&purchase.id);
                        if let Err(flag_err) =
                            self.purchase_repo.flag_for_review(purchase.id).await
                        {
                            error!(
                                "Failed to flag purchase {} for review: {}",
                                purchase.id, flag_err
                            );
                        }
                        self.events.publish(DomainEvent::RepaymentFlagged {
                            purchase_id: purchase.id,
                            attempts,
                        });
                    } else {
                        drop(stats);
                        let backoff_secs = self
                            .config
                            .retry_backoff_secs
                            .saturating_mul(1u64 << (attempts - 1).min(16));
                        state.retries.insert(
                            purchase.id,
                            RetryState {
                                attempts,
                                next_attempt: now + Duration::seconds(backoff_secs as i64),
                            },
                        );
                    }
                }
            }
        }
        drop(state);

        self.stats.write().await.last_run = Some(now);
        Ok(summary)
    }

    /// Snapshot of the operational counters
    pub async fn get_stats(&self) -> AutoRepaymentStats {
        let mut snapshot = self.stats.read().await.clone();
        snapshot.uptime_secs = self.started_at.elapsed().as_secs();
        snapshot
    }

    /// Zero the counters and clear the error log; listings and wallets are
    /// never touched
    pub async fn reset_stats(&self) {
        self.stats.write().await.reset();
        info!("Auto-repayment statistics reset");
    }
}
