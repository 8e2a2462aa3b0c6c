//! Alipay to OFX Converter Library
//!
//! Converts an exported Alipay transaction statement into an OFX 2.0.2
//! credit card statement that personal-finance software can import.
//!
//! # Pipeline
//!
//! - **Decoder**: GB2312/GBK bytes to text
//! - **Statement parser**: fixed header/footer removal and field mapping
//! - **Envelope**: account id and covered period
//! - **OFX builder**: markup rendering with OFX date-times
//!
//! # Examples
//!
//! ## Converting a statement file
//!
//! ```no_run
//! use std::fs;
//! use alipay2ofx::{convert, decoder::default_encoding};
//!
//! let bytes = fs::read("alipay_record.csv")?;
//! let ofx = convert(&bytes, default_encoding())?;
//! fs::write("alipay_export.ofx", ofx)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Emitting timestamps in the local timezone
//!
//! ```no_run
//! use alipay2ofx::{convert_with, ConvertOptions, OutputZone};
//!
//! let bytes = std::fs::read("alipay_record.csv")?;
//! let options = ConvertOptions::default().with_output_zone(OutputZone::Local);
//! let ofx = convert_with(&bytes, &options)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod decoder;
pub mod alipay_format;
pub mod envelope;
pub mod ofx_format;
pub mod config;
pub mod conversion;

use chrono::{DateTime, FixedOffset, Local, Offset};
use std::str::FromStr;

// Re-export commonly used types
pub use config::ConvertOptions;
pub use conversion::{convert, convert_with};
pub use error::{Error, Result};
pub use types::{FlowDirection, FundStatus, StatementEnvelope, TimeRange, Transaction};

/// Timezone used for emitted OFX timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputZone {
    /// The statement's home offset, UTC+8. Deterministic.
    #[default]
    Home,
    /// The executing environment's local offset.
    Local,
}

impl FromStr for OutputZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "home" | "cst" | "utc+8" | "+08" => Ok(OutputZone::Home),
            "local" | "system" => Ok(OutputZone::Local),
            _ => Err(Error::InvalidOption(format!("unknown timezone: {}", s))),
        }
    }
}

impl OutputZone {
    /// Express `at` in this zone. The instant is unchanged.
    pub fn apply(&self, at: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            OutputZone::Home => at.with_timezone(&types::home_offset()),
            OutputZone::Local => {
                let offset = at.with_timezone(&Local).offset().fix();
                at.with_timezone(&offset)
            }
        }
    }
}
