use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One failed automatic repayment attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerErrorRecord {
    pub timestamp: NaiveDateTime,
    pub error: String,
    /// Human-readable reference to the failing purchase
    pub context: String,
}

/// Operational counters for the expiry scheduler
///
/// Reset only by explicit operator action; resetting touches counters and
/// the error log, never listings or wallets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoRepaymentStats {
    pub total_scheduled: u64,
    pub total_executed: u64,
    pub total_failed: u64,
    pub total_retries: u64,
    pub recent_errors: VecDeque<SchedulerErrorRecord>,
    pub last_run: Option<NaiveDateTime>,
    /// Filled from process start time when a snapshot is taken
    pub uptime_secs: u64,
}

impl AutoRepaymentStats {
    /// Append an error record, discarding the oldest beyond `capacity`
    pub fn push_error(&mut self, record: SchedulerErrorRecord, capacity: usize) {
        if self.recent_errors.len() >= capacity {
            self.recent_errors.pop_front();
        }
        self.recent_errors.push_back(record);
    }

    /// Zero the counters and clear the error log
    pub fn reset(&mut self) {
        self.total_scheduled = 0;
        self.total_executed = 0;
        self.total_failed = 0;
        self.total_retries = 0;
        self.recent_errors.clear();
    }
}
