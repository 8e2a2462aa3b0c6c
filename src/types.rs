//! Common types shared by the parser and the OFX builder.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Offset of the statement's home timezone (UTC+8), in seconds east of UTC.
pub const HOME_OFFSET_SECS: i32 = 8 * 3600;

/// Fixed offset every statement timestamp is interpreted in.
pub fn home_offset() -> FixedOffset {
    FixedOffset::east_opt(HOME_OFFSET_SECS).expect("UTC+8 is within offset bounds")
}

/// One statement line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique transaction number, used as FITID/REFNUM.
    pub transaction_id: String,

    /// Merchant order number.
    pub merchant_order_id: String,

    /// Creation time.
    pub created_at: DateTime<FixedOffset>,

    /// Payment time, absent for unpaid or cancelled transactions.
    pub paid_at: Option<DateTime<FixedOffset>>,

    /// Last modification time.
    pub last_modified_at: DateTime<FixedOffset>,

    /// Where the transaction originated.
    pub source_channel: String,

    /// Transaction category.
    pub category: String,

    /// Counterparty name.
    pub counterparty: String,

    /// Product name.
    pub product_name: String,

    /// Amount (non-negative magnitude).
    pub amount: Decimal,

    /// Receipt/payment indicator.
    pub flow_direction: FlowDirection,

    /// Transaction status, passed through as-is.
    pub status: String,

    /// Service fee, subtracted from the settled amount.
    pub service_fee: Decimal,

    /// Amount refunded so far.
    pub refunded_amount: Decimal,

    /// Free-text note.
    pub note: String,

    /// Fund settlement direction.
    pub fund_status: FundStatus,
}

impl Transaction {
    /// Payment time if known, else creation time.
    pub fn settled_at(&self) -> DateTime<FixedOffset> {
        self.paid_at.unwrap_or(self.created_at)
    }
}

/// Receipt/payment indicator (`收/支`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowDirection {
    Receipt,
    Payment,
    Transfer,
    Unknown,
}

impl FlowDirection {
    /// Map a statement token. Unrecognised tokens become `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "收入" => FlowDirection::Receipt,
            "支出" => FlowDirection::Payment,
            "不计收支" => FlowDirection::Transfer,
            _ => FlowDirection::Unknown,
        }
    }
}

/// Fund status (`资金状态`), drives OFX credit/debit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundStatus {
    Paid,
    Received,
    Transferred,
    Unknown,
}

impl FundStatus {
    /// Map a statement token. Unrecognised tokens become `Unknown`.
    pub fn from_token(token: &str) -> Self {
        match token {
            "已支出" => FundStatus::Paid,
            "已收入" => FundStatus::Received,
            "资金转移" => FundStatus::Transferred,
            _ => FundStatus::Unknown,
        }
    }
}

/// Inclusive span of settlement timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// Account id and period covered by a statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEnvelope {
    /// Account identification from the header.
    pub account_id: String,

    /// `None` when the statement has no transactions.
    pub range: Option<TimeRange>,
}

impl StatementEnvelope {
    pub fn period_start(&self) -> Option<DateTime<FixedOffset>> {
        self.range.map(|r| r.start)
    }

    pub fn period_end(&self) -> Option<DateTime<FixedOffset>> {
        self.range.map(|r| r.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_direction_tokens() {
        assert_eq!(FlowDirection::from_token("收入"), FlowDirection::Receipt);
        assert_eq!(FlowDirection::from_token("支出"), FlowDirection::Payment);
        assert_eq!(FlowDirection::from_token("不计收支"), FlowDirection::Transfer);
        assert_eq!(FlowDirection::from_token(""), FlowDirection::Unknown);
        assert_eq!(FlowDirection::from_token("其他"), FlowDirection::Unknown);
    }

    #[test]
    fn test_fund_status_tokens() {
        assert_eq!(FundStatus::from_token("已支出"), FundStatus::Paid);
        assert_eq!(FundStatus::from_token("已收入"), FundStatus::Received);
        assert_eq!(FundStatus::from_token("资金转移"), FundStatus::Transferred);
        assert_eq!(FundStatus::from_token("已结清"), FundStatus::Unknown);
    }

    #[test]
    fn test_home_offset() {
        assert_eq!(home_offset().local_minus_utc(), 8 * 3600);
    }
}
