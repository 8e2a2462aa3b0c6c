//! Decoding of raw statement bytes.
//!
//! Alipay exports statements as GB2312. Browsers and `encoding_rs` both map
//! the `gb2312` label onto GBK, a superset, so GBK is the default here.

use crate::error::{Error, Result};
use encoding_rs::{Encoding, GBK};

/// Encoding used when none is specified.
pub fn default_encoding() -> &'static Encoding {
    GBK
}

/// Look up an encoding by its WHATWG label (`gb2312`, `gbk`, `utf-8`, ...).
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| Error::UnknownEncoding(label.to_string()))
}

/// Decode `bytes` as `encoding`.
///
/// A leading byte order mark for the same encoding is dropped. Any byte
/// sequence that is malformed in `encoding` fails the whole decode.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };

    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(|text| text.into_owned())
        .ok_or(Error::Decoding {
            encoding: encoding.name(),
        })
}
