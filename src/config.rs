use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Expiry scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub scan_interval_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_secs: u64,
    pub error_log_capacity: usize,
    pub warning_lead_hours: i64,
}

/// Ledger configuration: payee routing and referral commission
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Platform proceeds account credited on repayment; the buyer when unset
    pub proceeds_account: Option<Uuid>,
    /// Share of the repayment credited to the payee's referrer (0 disables)
    pub referral_commission_rate: Decimal,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub scheduler: SchedulerConfig,
    pub ledger: LedgerConfig,
    pub log_level: String,
    pub environment: String,
}

impl SchedulerConfig {
    /// Create scheduler config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let scan_interval_secs = env::var("SCHEDULER_SCAN_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        let max_retries = env::var("SCHEDULER_MAX_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(5);

        let retry_backoff_secs = env::var("SCHEDULER_RETRY_BACKOFF_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let error_log_capacity = env::var("SCHEDULER_ERROR_LOG_CAPACITY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(50);

        let warning_lead_hours = env::var("SCHEDULER_WARNING_LEAD_HOURS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(24);

        // Validate configuration
        if scan_interval_secs == 0 {
            return Err("SCHEDULER_SCAN_INTERVAL_SECS must be greater than 0".to_string());
        }

        if error_log_capacity == 0 {
            return Err("SCHEDULER_ERROR_LOG_CAPACITY must be greater than 0".to_string());
        }

        if retry_backoff_secs == 0 {
            return Err("SCHEDULER_RETRY_BACKOFF_SECS must be greater than 0".to_string());
        }

        if warning_lead_hours < 0 {
            return Err("SCHEDULER_WARNING_LEAD_HOURS must not be negative".to_string());
        }

        Ok(Self {
            scan_interval_secs,
            max_retries,
            retry_backoff_secs,
            error_log_capacity,
            warning_lead_hours,
        })
    }

    /// Get scan interval as Duration
    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 60,
            max_retries: 5,
            retry_backoff_secs: 30,
            error_log_capacity: 50,
            warning_lead_hours: 24,
        }
    }
}

impl LedgerConfig {
    /// Create ledger config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let proceeds_account = match env::var("PROCEEDS_ACCOUNT") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                Uuid::parse_str(raw.trim())
                    .map_err(|e| format!("Invalid PROCEEDS_ACCOUNT: {}", e))?,
            ),
            _ => None,
        };

        let referral_commission_rate = match env::var("REFERRAL_COMMISSION_RATE") {
            Ok(raw) => Decimal::from_str(raw.trim())
                .map_err(|e| format!("Invalid REFERRAL_COMMISSION_RATE: {}", e))?,
            Err(_) => Decimal::ZERO,
        };

        if referral_commission_rate < Decimal::ZERO || referral_commission_rate >= Decimal::ONE {
            return Err("REFERRAL_COMMISSION_RATE must be in [0, 1)".to_string());
        }

        Ok(Self {
            proceeds_account,
            referral_commission_rate,
        })
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            proceeds_account: None,
            referral_commission_rate: Decimal::ZERO,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let scheduler = SchedulerConfig::from_env()?;
        let ledger = LedgerConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            scheduler,
            ledger,
            log_level: log_level.to_lowercase(),
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            ledger: LedgerConfig::default(),
            log_level: "info".to_string(),
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.scan_interval_secs, 60);
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.error_log_capacity, 50);
        assert_eq!(config.scan_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_ledger_config_default() {
        let config = LedgerConfig::default();
        assert!(config.proceeds_account.is_none());
        assert_eq!(config.referral_commission_rate, Decimal::ZERO);
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.log_level, "info");
        assert!(config.is_development());
        assert!(!config.is_production());
    }
}
