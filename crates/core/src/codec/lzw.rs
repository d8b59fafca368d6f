//! LZW stream decoder using weezl crate.

use crate::error::{PdfError, Result};
use weezl::{BitOrder, decode::Decoder};

/// Decode LZW-encoded data (MSB first, 8-bit, early code-size change).
pub fn lzwdecode(data: &[u8]) -> Result<Vec<u8>> {
    lzwdecode_with_earlychange(data, 1)
}

/// Decode LZW-encoded data with an explicit `EarlyChange` setting.
///
/// `EarlyChange` 1 (the default) widens codes one entry early, which is
/// weezl's TIFF size switch; 0 widens them exactly when the table fills.
pub fn lzwdecode_with_earlychange(data: &[u8], early_change: i64) -> Result<Vec<u8>> {
    let mut decoder = match early_change {
        0 => Decoder::new(BitOrder::Msb, 8),
        1 => Decoder::with_tiff_size_switch(BitOrder::Msb, 8),
        other => {
            return Err(PdfError::DecodeError(format!(
                "LZWDecode: invalid EarlyChange {other}"
            )));
        }
    };
    decoder
        .decode(data)
        .map_err(|e| PdfError::DecodeError(format!("LZWDecode: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lzwdecode() {
        let input = b"\x80\x0b\x60\x50\x22\x0c\x0c\x85\x01";
        let expected = b"\x2d\x2d\x2d\x2d\x2d\x41\x2d\x2d\x2d\x42";
        assert_eq!(lzwdecode(input).unwrap(), expected);
    }

    #[test]
    fn test_invalid_earlychange() {
        assert!(lzwdecode_with_earlychange(b"\x80", 2).is_err());
    }
}
