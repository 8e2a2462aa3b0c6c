//! Statement to OFX conversion pipeline.
//!
//! Runs decode, parse, envelope extraction and rendering in sequence. The
//! first failure is returned unchanged and no partial document is produced.

use crate::alipay_format::AlipayStatement;
use crate::config::ConvertOptions;
use crate::decoder::decode;
use crate::error::Result;
use crate::ofx_format::OfxDocument;
use encoding_rs::Encoding;
use std::io::Write;
use tracing::{debug, info};

/// Convert raw statement bytes in `encoding` to an OFX document.
pub fn convert(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    convert_with(bytes, &ConvertOptions::new(encoding))
}

/// Convert raw statement bytes to an OFX document using `options`.
pub fn convert_with(bytes: &[u8], options: &ConvertOptions) -> Result<String> {
    let text = decode(bytes, options.encoding)?;
    debug!(bytes = bytes.len(), encoding = options.encoding.name(), "decoded statement");

    let statement = AlipayStatement::from_text(&text)?;
    Ok(statement.to_ofx(options))
}

impl AlipayStatement {
    /// OFX view of this statement.
    pub fn ofx_document(&self) -> OfxDocument<'_> {
        OfxDocument {
            account_id: &self.envelope.account_id,
            transactions: &self.transactions,
            range: self.envelope.range,
        }
    }

    /// Render this statement as an OFX document.
    pub fn to_ofx(&self, options: &ConvertOptions) -> String {
        self.log_summary();
        self.ofx_document().render(options)
    }

    /// Write this statement as an OFX document to any destination implementing `Write`.
    pub fn write_to<W: Write>(&self, writer: &mut W, options: &ConvertOptions) -> Result<()> {
        self.log_summary();
        self.ofx_document().write_to(writer, options)
    }

    fn log_summary(&self) {
        info!(
            account = %self.envelope.account_id,
            transactions = self.transactions.len(),
            start = ?self.envelope.period_start(),
            end = ?self.envelope.period_end(),
            "converted statement"
        );
    }
}
