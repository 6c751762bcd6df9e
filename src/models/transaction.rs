//! Ledger entry models and query/aggregation types

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction types for fund movements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Recharge,
    Withdraw,
    Purchase,
    Repay,
    ReferralCommission,
    SaleProceeds,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recharge => "recharge",
            Self::Withdraw => "withdraw",
            Self::Purchase => "purchase",
            Self::Repay => "repay",
            Self::ReferralCommission => "referral_commission",
            Self::SaleProceeds => "sale_proceeds",
        }
    }

    /// Parse a boundary string; legacy uppercase forms are normalized here
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "recharge" => Some(Self::Recharge),
            "withdraw" => Some(Self::Withdraw),
            "purchase" => Some(Self::Purchase),
            "repay" => Some(Self::Repay),
            "referral_commission" => Some(Self::ReferralCommission),
            "sale_proceeds" => Some(Self::SaleProceeds),
            _ => None,
        }
    }
}

/// Transaction status; terminal statuses never revert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
    Cancelled,
}

impl TransactionStatus {
    /// Parse a boundary string, folding legacy synonyms onto the canonical
    /// variants ("approved" -> Completed, "failed" -> Rejected)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" | "approved" => Some(Self::Completed),
            "rejected" | "failed" => Some(Self::Rejected),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Operator decision on a pending audited entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Append-only ledger entry for every balance-affecting event
///
/// Credits carry positive amounts, debits negative ones. Entries created by
/// the audit workflow start Pending; entries applied atomically (purchase,
/// repay, commission, proceeds) are born Completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Store-assigned monotonic sequence; orders the ledger
    pub seq: u64,
    pub user_id: Uuid,
    pub listing_id: Option<Uuid>,
    pub purchase_id: Option<Uuid>,
    pub tx_type: TransactionType,
    pub amount: Decimal,
    pub status: TransactionStatus,
    pub balance_before: Decimal,
    pub balance_after: Decimal,
    pub remark: Option<String>,
    /// Proof-of-payment reference attached to recharge requests
    pub proof: Option<String>,
    /// Counterparty account info attached to withdraw requests
    pub payout_account: Option<String>,
    pub created_at: NaiveDateTime,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<NaiveDateTime>,
}

impl Transaction {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }
}

/// Filters for ledger queries
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: Option<Uuid>,
    pub tx_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub limit: Option<usize>,
}

/// Income/expense totals for one reporting window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStat {
    pub income: Decimal,
    pub expense: Decimal,
}

/// Aggregate income/expense buckets over completed ledger entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletStatistics {
    pub today: PeriodStat,
    pub yesterday: PeriodStat,
    pub this_week: PeriodStat,
    pub this_month: PeriodStat,
}
