//! Statement envelope: account id and covered period.

use crate::alipay_format::extract_account;
use crate::error::Result;
use crate::types::{StatementEnvelope, TimeRange, Transaction};

/// Inclusive span of settlement timestamps, `None` for an empty list.
pub fn compute_range(transactions: &[Transaction]) -> Option<TimeRange> {
    transactions
        .iter()
        .map(Transaction::settled_at)
        .fold(None, |range: Option<TimeRange>, at| match range {
            None => Some(TimeRange { start: at, end: at }),
            Some(TimeRange { start, end }) => Some(TimeRange {
                start: if at < start { at } else { start },
                end: if at > end { at } else { end },
            }),
        })
}

impl StatementEnvelope {
    /// Build the envelope from decoded statement text and its parsed transactions.
    pub fn from_statement(text: &str, transactions: &[Transaction]) -> Result<Self> {
        Ok(StatementEnvelope {
            account_id: extract_account(text)?,
            range: compute_range(transactions),
        })
    }
}
