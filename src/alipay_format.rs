//! Alipay statement parser.
//!
//! An exported statement has a fixed layout:
//!
//! - line 0: title
//! - line 1: account line, the account id is bracketed as `[id]`
//! - lines 2-4: query period and column headings
//! - data lines, one transaction each
//! - 8 trailer lines with totals and export metadata
//!
//! Data fields are comma-separated. Some fields carry a footnote after a
//! tab, which is discarded.

use crate::error::{Error, Result};
use crate::types::{home_offset, FlowDirection, FundStatus, StatementEnvelope, Transaction};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::io::Read;
use std::str::FromStr;
use tracing::{debug, warn};

/// Number of header lines before the first data line.
pub const HEADER_LINES: usize = 5;

/// Number of trailer lines after the last data line.
pub const FOOTER_LINES: usize = 8;

/// Number of fields in a data line.
pub const FIELD_COUNT: usize = 16;

/// Line holding the bracketed account id.
pub const ACCOUNT_LINE: usize = 1;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A parsed Alipay statement.
#[derive(Debug, Clone, PartialEq)]
pub struct AlipayStatement {
    /// Account id and covered period.
    pub envelope: StatementEnvelope,

    /// Transactions in source order.
    pub transactions: Vec<Transaction>,
}

impl AlipayStatement {
    /// Parse a statement from decoded text.
    ///
    /// Data lines are parsed before the account line is read, so a malformed
    /// record is reported ahead of a malformed header.
    pub fn from_text(text: &str) -> Result<Self> {
        let transactions = parse(text)?;
        let envelope = StatementEnvelope::from_statement(text, &transactions)?;
        Ok(AlipayStatement {
            envelope,
            transactions,
        })
    }

    /// Read, decode and parse a statement from any source implementing `Read`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::fs::File;
    /// use alipay2ofx::alipay_format::AlipayStatement;
    /// use alipay2ofx::decoder::default_encoding;
    ///
    /// let mut file = File::open("alipay_record.csv")?;
    /// let statement = AlipayStatement::from_read(&mut file, default_encoding())?;
    /// println!("{} transactions", statement.transactions.len());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_read<R: Read>(
        reader: &mut R,
        encoding: &'static encoding_rs::Encoding,
    ) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = crate::decoder::decode(&bytes, encoding)?;
        Self::from_text(&text)
    }
}

/// Parse the data lines of a decoded statement, in source order.
///
/// The first [`HEADER_LINES`] and last [`FOOTER_LINES`] lines are dropped by
/// position. A statement with nothing in between yields no transactions.
pub fn parse(text: &str) -> Result<Vec<Transaction>> {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= HEADER_LINES + FOOTER_LINES {
        debug!(lines = lines.len(), "statement has no data lines");
        return Ok(Vec::new());
    }

    let data = &lines[HEADER_LINES..lines.len() - FOOTER_LINES];
    let mut seen = HashSet::with_capacity(data.len());
    let mut transactions = Vec::with_capacity(data.len());

    for (offset, line) in data.iter().enumerate() {
        let line_no = HEADER_LINES + offset;
        let transaction = parse_record(line, line_no)?;
        if !seen.insert(transaction.transaction_id.clone()) {
            return Err(Error::DuplicateTransactionId {
                id: transaction.transaction_id,
                line: line_no,
            });
        }
        transactions.push(transaction);
    }

    debug!(count = transactions.len(), "parsed statement records");
    Ok(transactions)
}

/// Return the account id bracketed on the account line.
pub fn extract_account(text: &str) -> Result<String> {
    let line = text
        .split('\n')
        .nth(ACCOUNT_LINE)
        .ok_or_else(|| Error::HeaderFormat("missing account line".to_string()))?;

    let open = line
        .find('[')
        .ok_or_else(|| Error::HeaderFormat(format!("no '[' in account line: {}", line.trim())))?;
    let rest = &line[open + 1..];
    let close = rest
        .find(']')
        .ok_or_else(|| Error::HeaderFormat(format!("no ']' in account line: {}", line.trim())))?;

    Ok(rest[..close].to_string())
}

/// Split a data line into trimmed fields, dropping tab-suffixed footnotes.
fn split_fields(line: &str) -> Vec<&str> {
    line.split(',')
        .map(|field| field.split('\t').next().unwrap_or(field).trim())
        .collect()
}

fn parse_record(line: &str, line_no: usize) -> Result<Transaction> {
    let fields = split_fields(line);
    if fields.len() < FIELD_COUNT {
        return Err(Error::MalformedRecord {
            line: line_no,
            fields: fields.len(),
        });
    }

    // Column order is fixed by the export.
    let transaction_id = fields[0];
    if transaction_id.is_empty() {
        return Err(Error::FieldParse {
            field: "transaction_id",
            line: line_no,
            value: String::new(),
        });
    }

    let flow_direction = FlowDirection::from_token(fields[10]);
    if flow_direction == FlowDirection::Unknown && !fields[10].is_empty() {
        warn!(line = line_no, token = fields[10], "unrecognised receipt/payment token");
    }
    let fund_status = FundStatus::from_token(fields[15]);
    if fund_status == FundStatus::Unknown && !fields[15].is_empty() {
        warn!(line = line_no, token = fields[15], "unrecognised fund status token");
    }

    Ok(Transaction {
        transaction_id: transaction_id.to_string(),
        merchant_order_id: fields[1].to_string(),
        created_at: parse_timestamp(fields[2], "created_at", line_no)?,
        paid_at: if fields[3].is_empty() {
            None
        } else {
            Some(parse_timestamp(fields[3], "paid_at", line_no)?)
        },
        last_modified_at: parse_timestamp(fields[4], "last_modified_at", line_no)?,
        source_channel: fields[5].to_string(),
        category: fields[6].to_string(),
        counterparty: fields[7].to_string(),
        product_name: fields[8].to_string(),
        amount: parse_non_negative(fields[9], "amount", line_no)?,
        flow_direction,
        status: fields[11].to_string(),
        service_fee: parse_non_negative(fields[12], "service_fee", line_no)?,
        refunded_amount: parse_amount(fields[13], "refunded_amount", line_no)?,
        note: fields[14].to_string(),
        fund_status,
    })
}

/// Parse `YYYY-MM-DD HH:MM:SS` in the statement's home timezone.
fn parse_timestamp(raw: &str, field: &'static str, line: usize) -> Result<DateTime<FixedOffset>> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .and_then(|naive| home_offset().from_local_datetime(&naive).single())
        .ok_or_else(|| Error::FieldParse {
            field,
            line,
            value: raw.to_string(),
        })
}

fn parse_amount(raw: &str, field: &'static str, line: usize) -> Result<Decimal> {
    Decimal::from_str(raw).map_err(|_| Error::FieldParse {
        field,
        line,
        value: raw.to_string(),
    })
}

fn parse_non_negative(raw: &str, field: &'static str, line: usize) -> Result<Decimal> {
    let amount = parse_amount(raw, field, line)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(Error::FieldParse {
            field,
            line,
            value: raw.to_string(),
        });
    }
    Ok(amount)
}
