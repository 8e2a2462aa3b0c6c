//! Conversion options.

use crate::decoder::{default_encoding, encoding_for_label};
use crate::error::Result;
use crate::OutputZone;
use encoding_rs::Encoding;

/// Settings for one conversion run.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Character encoding of the source statement.
    pub encoding: &'static Encoding,

    /// Timezone emitted timestamps are expressed in.
    pub output_zone: OutputZone,

    /// Statement currency (CURDEF).
    pub currency: String,

    /// Financial institution name (ORG).
    pub org: String,

    /// Financial institution id (FID).
    pub fid: String,

    /// Signon language.
    pub language: String,

    /// Signon status message.
    pub message: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            output_zone: OutputZone::Home,
            currency: "CNY".to_string(),
            org: "支付宝".to_string(),
            fid: "ALIPAY".to_string(),
            language: "CHI".to_string(),
            message: "Converted by alipay2ofx".to_string(),
        }
    }
}

impl ConvertOptions {
    /// Default options reading the statement in `encoding`.
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    /// Replace the source encoding by WHATWG label.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self> {
        self.encoding = encoding_for_label(label)?;
        Ok(self)
    }

    pub fn with_output_zone(mut self, zone: OutputZone) -> Self {
        self.output_zone = zone;
        self
    }
}
