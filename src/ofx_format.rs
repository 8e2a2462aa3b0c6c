//! OFX 2.0.2 document builder.
//!
//! Produces a `CREDITCARDMSGSRSV1`/`CCSTMTTRNRS` statement response. Markup is
//! written by hand with tab indentation; `&`, `<` and `>` in element text are
//! escaped.

use crate::config::ConvertOptions;
use crate::types::{FundStatus, TimeRange, Transaction};
use chrono::{DateTime, FixedOffset, Utc};
use quick_xml::escape::partial_escape;
use rust_decimal::Decimal;
use std::io::Write;

/// An OFX statement ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct OfxDocument<'a> {
    /// Credit card account id.
    pub account_id: &'a str,

    /// Transactions, rendered in order.
    pub transactions: &'a [Transaction],

    /// Period covered, `None` renders empty DTSTART/DTEND.
    pub range: Option<TimeRange>,
}

/// Render a complete document stamped with the current time.
pub fn build(
    account_id: &str,
    transactions: &[Transaction],
    range: Option<TimeRange>,
    options: &ConvertOptions,
) -> String {
    OfxDocument {
        account_id,
        transactions,
        range,
    }
    .render(options)
}

impl OfxDocument<'_> {
    /// Render the document with DTSERVER set to now.
    pub fn render(&self, options: &ConvertOptions) -> String {
        let now = Utc::now().with_timezone(&crate::types::home_offset());
        self.render_at(options, now)
    }

    /// Render the document with an explicit server time.
    pub fn render_at(&self, options: &ConvertOptions, server_time: DateTime<FixedOffset>) -> String {
        let zone = options.output_zone;
        let mut out = String::new();

        push(&mut out, 0, r#"<?xml version="1.0" standalone="no"?>"#);
        push(
            &mut out,
            0,
            r#"<?OFX OFXHEADER="200" VERSION="202" SECURITY="NONE" OLDFILEUID="NONE" NEWFILEUID="NONE"?>"#,
        );
        push(&mut out, 0, "<OFX>");
        push(&mut out, 1, "<SIGNONMSGSRSV1>");
        push(&mut out, 2, "<SONRS>");
        push(&mut out, 3, "<STATUS>");
        push(&mut out, 4, "<CODE>0</CODE>");
        push(&mut out, 4, "<SEVERITY>INFO</SEVERITY>");
        element(&mut out, 4, "MESSAGE", &options.message);
        push(&mut out, 3, "</STATUS>");
        element(
            &mut out,
            3,
            "DTSERVER",
            &format_ofx_datetime(&zone.apply(server_time)),
        );
        element(&mut out, 3, "LANGUAGE", &options.language);
        push(&mut out, 3, "<FI>");
        element(&mut out, 4, "ORG", &options.org);
        element(&mut out, 4, "FID", &options.fid);
        push(&mut out, 3, "</FI>");
        push(&mut out, 2, "</SONRS>");
        push(&mut out, 1, "</SIGNONMSGSRSV1>");

        push(&mut out, 1, "<CREDITCARDMSGSRSV1>");
        push(&mut out, 2, "<CCSTMTTRNRS>");
        push(&mut out, 3, "<TRNUID>0</TRNUID>");
        push(&mut out, 3, "<STATUS>");
        push(&mut out, 4, "<CODE>0</CODE>");
        push(&mut out, 4, "<SEVERITY>INFO</SEVERITY>");
        push(&mut out, 3, "</STATUS>");
        push(&mut out, 3, "<CCSTMTRS>");
        element(&mut out, 4, "CURDEF", &options.currency);
        push(&mut out, 4, "<CCACCTFROM>");
        element(&mut out, 5, "ACCTID", self.account_id);
        push(&mut out, 4, "</CCACCTFROM>");
        push(&mut out, 4, "<BANKTRANLIST>");
        let (start, end) = match self.range {
            Some(range) => (
                format_ofx_datetime(&zone.apply(range.start)),
                format_ofx_datetime(&zone.apply(range.end)),
            ),
            None => (String::new(), String::new()),
        };
        element(&mut out, 5, "DTSTART", &start);
        element(&mut out, 5, "DTEND", &end);

        for transaction in self.transactions {
            push(&mut out, 5, "<STMTTRN>");
            element(&mut out, 6, "TRNTYPE", transaction_type(transaction));
            element(
                &mut out,
                6,
                "DTPOSTED",
                &format_ofx_datetime(&zone.apply(transaction.settled_at())),
            );
            element(&mut out, 6, "TRNAMT", &format_amount(net_amount(transaction)));
            element(&mut out, 6, "FITID", &transaction.transaction_id);
            element(&mut out, 6, "REFNUM", &transaction.transaction_id);
            element(&mut out, 6, "NAME", &transaction.counterparty);
            element(&mut out, 6, "MEMO", &memo(transaction));
            push(&mut out, 5, "</STMTTRN>");
        }

        push(&mut out, 4, "</BANKTRANLIST>");
        push(&mut out, 3, "</CCSTMTRS>");
        push(&mut out, 2, "</CCSTMTTRNRS>");
        push(&mut out, 1, "</CREDITCARDMSGSRSV1>");
        push(&mut out, 0, "</OFX>");

        out
    }

    /// Write the rendered document to any destination implementing `Write`.
    pub fn write_to<W: Write>(&self, writer: &mut W, options: &ConvertOptions) -> crate::Result<()> {
        writer.write_all(self.render(options).as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}

fn push(out: &mut String, depth: usize, markup: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push_str(markup);
    out.push('\n');
}

fn element(out: &mut String, depth: usize, tag: &str, text: &str) {
    for _ in 0..depth {
        out.push('\t');
    }
    out.push_str(&format!("<{tag}>{}</{tag}>\n", partial_escape(text)));
}

/// `CREDIT` for received funds, `DEBIT` for everything else.
pub fn transaction_type(transaction: &Transaction) -> &'static str {
    match transaction.fund_status {
        FundStatus::Received => "CREDIT",
        _ => "DEBIT",
    }
}

/// Signed amount net of the service fee.
///
/// Received funds are positive, all other fund states negative; the fee is
/// subtracted in both cases.
pub fn net_amount(transaction: &Transaction) -> Decimal {
    let signed = match transaction.fund_status {
        FundStatus::Received => transaction.amount,
        _ => -transaction.amount,
    };
    let net = signed - transaction.service_fee;
    if net.is_zero() {
        Decimal::ZERO
    } else {
        net
    }
}

/// Format an amount with exactly two decimals.
pub fn format_amount(amount: Decimal) -> String {
    let mut rounded = amount.round_dp(2);
    rounded.rescale(2);
    rounded.to_string()
}

/// Product name and note joined by a space, trimmed.
pub fn memo(transaction: &Transaction) -> String {
    format!("{} {}", transaction.product_name, transaction.note)
        .trim()
        .to_string()
}

/// Format a timestamp as `YYYYMMDDHHMMSS.mmm[±HH]`.
///
/// The bracketed hours follow the minutes-behind-UTC convention with the sign
/// flipped: UTC+8 renders as `[+08]`, UTC-5 as `[-05]` and UTC as `[-00]`.
pub fn format_ofx_datetime(at: &DateTime<FixedOffset>) -> String {
    let minutes_behind_utc = -at.offset().local_minus_utc() / 60;
    let sign = if minutes_behind_utc < 0 { '+' } else { '-' };
    let hours = minutes_behind_utc.abs() / 60;
    format!("{}[{}{:02}]", at.format("%Y%m%d%H%M%S%.3f"), sign, hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alipay_format::parse;
    use crate::alipay_format::tests::{statement, PAID, RECEIVED};
    use crate::types::{home_offset, FlowDirection};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn transaction(amount: &str, fee: &str, fund_status: FundStatus) -> Transaction {
        let at = home_offset().with_ymd_and_hms(2023, 5, 1, 8, 30, 15).unwrap();
        Transaction {
            transaction_id: "T1".into(),
            merchant_order_id: String::new(),
            created_at: at,
            paid_at: None,
            last_modified_at: at,
            source_channel: String::new(),
            category: String::new(),
            counterparty: "商户".into(),
            product_name: String::new(),
            amount: Decimal::from_str(amount).unwrap(),
            flow_direction: FlowDirection::Unknown,
            status: String::new(),
            service_fee: Decimal::from_str(fee).unwrap(),
            refunded_amount: Decimal::ZERO,
            note: String::new(),
            fund_status,
        }
    }

    #[test]
    fn test_format_ofx_datetime_home_offset() {
        let at = home_offset().with_ymd_and_hms(2023, 5, 1, 8, 30, 15).unwrap();
        assert_eq!(format_ofx_datetime(&at), "20230501083015.000[+08]");
    }

    #[test]
    fn test_format_ofx_datetime_other_offsets() {
        let utc = FixedOffset::east_opt(0).unwrap().with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_ofx_datetime(&utc), "20240102030405.000[-00]");

        let west = FixedOffset::west_opt(5 * 3600).unwrap().with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
        assert_eq!(format_ofx_datetime(&west), "20241231235959.000[-05]");

        let millis = utc + chrono::Duration::milliseconds(7);
        assert_eq!(format_ofx_datetime(&millis), "20240102030405.007[-00]");
    }

    #[test]
    fn test_net_amount() {
        let received = transaction("100.00", "1.00", FundStatus::Received);
        assert_eq!(format_amount(net_amount(&received)), "99.00");

        let paid = transaction("100.00", "1.00", FundStatus::Paid);
        assert_eq!(format_amount(net_amount(&paid)), "-101.00");

        let transferred = transaction("30", "1", FundStatus::Transferred);
        assert_eq!(format_amount(net_amount(&transferred)), "-31.00");

        let zero = transaction("0.00", "0.00", FundStatus::Paid);
        assert_eq!(format_amount(net_amount(&zero)), "0.00");
    }

    #[test]
    fn test_transaction_type() {
        assert_eq!(transaction_type(&transaction("1", "0", FundStatus::Received)), "CREDIT");
        assert_eq!(transaction_type(&transaction("1", "0", FundStatus::Paid)), "DEBIT");
        assert_eq!(transaction_type(&transaction("1", "0", FundStatus::Transferred)), "DEBIT");
        assert_eq!(transaction_type(&transaction("1", "0", FundStatus::Unknown)), "DEBIT");
    }

    #[test]
    fn test_memo() {
        let mut t = transaction("1", "0", FundStatus::Paid);
        assert_eq!(memo(&t), "");
        t.product_name = "书籍".into();
        assert_eq!(memo(&t), "书籍");
        t.note = "生日礼物".into();
        assert_eq!(memo(&t), "书籍 生日礼物");
        t.product_name.clear();
        assert_eq!(memo(&t), "生日礼物");
    }

    #[test]
    fn test_render_document() {
        let text = statement(&[RECEIVED, PAID]);
        let transactions = parse(&text).unwrap();
        let range = crate::envelope::compute_range(&transactions);
        let server_time = home_offset().with_ymd_and_hms(2023, 6, 1, 10, 0, 0).unwrap();

        let document = OfxDocument {
            account_id: "6225**1234",
            transactions: &transactions,
            range,
        }
        .render_at(&ConvertOptions::default(), server_time);

        let expected = r#"<?xml version="1.0" standalone="no"?>
<?OFX OFXHEADER="200" VERSION="202" SECURITY="NONE" OLDFILEUID="NONE" NEWFILEUID="NONE"?>
<OFX>
	<SIGNONMSGSRSV1>
		<SONRS>
			<STATUS>
				<CODE>0</CODE>
				<SEVERITY>INFO</SEVERITY>
				<MESSAGE>Converted by alipay2ofx</MESSAGE>
			</STATUS>
			<DTSERVER>20230601100000.000[+08]</DTSERVER>
			<LANGUAGE>CHI</LANGUAGE>
			<FI>
				<ORG>支付宝</ORG>
				<FID>ALIPAY</FID>
			</FI>
		</SONRS>
	</SIGNONMSGSRSV1>
	<CREDITCARDMSGSRSV1>
		<CCSTMTTRNRS>
			<TRNUID>0</TRNUID>
			<STATUS>
				<CODE>0</CODE>
				<SEVERITY>INFO</SEVERITY>
			</STATUS>
			<CCSTMTRS>
				<CURDEF>CNY</CURDEF>
				<CCACCTFROM>
					<ACCTID>6225**1234</ACCTID>
				</CCACCTFROM>
				<BANKTRANLIST>
					<DTSTART>20230501083020.000[+08]</DTSTART>
					<DTEND>20230502120005.000[+08]</DTEND>
					<STMTTRN>
						<TRNTYPE>CREDIT</TRNTYPE>
						<DTPOSTED>20230501083020.000[+08]</DTPOSTED>
						<TRNAMT>10.00</TRNAMT>
						<FITID>2023050122001</FITID>
						<REFNUM>2023050122001</REFNUM>
						<NAME>张三</NAME>
						<MEMO>红包</MEMO>
					</STMTTRN>
					<STMTTRN>
						<TRNTYPE>DEBIT</TRNTYPE>
						<DTPOSTED>20230502120005.000[+08]</DTPOSTED>
						<TRNAMT>-20.50</TRNAMT>
						<FITID>2023050222002</FITID>
						<REFNUM>2023050222002</REFNUM>
						<NAME>某商店</NAME>
						<MEMO>书籍 生日礼物</MEMO>
					</STMTTRN>
				</BANKTRANLIST>
			</CCSTMTRS>
		</CCSTMTTRNRS>
	</CREDITCARDMSGSRSV1>
</OFX>
"#;
        assert_eq!(document, expected);
    }

    #[test]
    fn test_render_empty_range() {
        let document = build("6225**1234", &[], None, &ConvertOptions::default());
        assert!(document.contains("<DTSTART></DTSTART>"));
        assert!(document.contains("<DTEND></DTEND>"));
        assert!(!document.contains("<STMTTRN>"));
    }

    #[test]
    fn test_write_to() {
        let document = OfxDocument {
            account_id: "6225**1234",
            transactions: &[],
            range: None,
        };
        let mut buffer = Vec::new();
        document.write_to(&mut buffer, &ConvertOptions::default()).unwrap();
        let written = String::from_utf8(buffer).unwrap();
        assert!(written.starts_with("<?xml"));
        assert!(written.ends_with("</OFX>\n"));
    }

    #[test]
    fn test_render_escapes_text() {
        let mut t = transaction("5.00", "0.00", FundStatus::Paid);
        t.counterparty = "A&B <Shop>".into();
        let document = build("6225**1234", &[t], None, &ConvertOptions::default());
        assert!(document.contains("<NAME>A&amp;B &lt;Shop&gt;</NAME>"));
    }

    #[test]
    fn test_render_keeps_quotes_verbatim() {
        let mut t = transaction("5.00", "0.00", FundStatus::Paid);
        t.counterparty = "McDonald's".into();
        t.product_name = "\"Big Mac\"".into();
        let document = build("6225**1234", &[t], None, &ConvertOptions::default());
        assert!(document.contains("<NAME>McDonald's</NAME>"));
        assert!(document.contains("<MEMO>\"Big Mac\"</MEMO>"));
    }
}
