//! FlateDecode (zlib) decompression.

use crate::error::{PdfError, Result};
use flate2::read::ZlibDecoder;
use std::io::Read;

/// Inflate zlib-wrapped deflate data. Corrupt or truncated input is an error.
pub fn flatedecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(data.len().saturating_mul(2));
    decoder
        .read_to_end(&mut out)
        .map_err(|e| PdfError::DecodeError(format!("FlateDecode: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    #[test]
    fn test_inflate() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"BT /F1 12 Tf (Hi) Tj ET").unwrap();
        let packed = enc.finish().unwrap();
        assert_eq!(flatedecode(&packed).unwrap(), b"BT /F1 12 Tf (Hi) Tj ET");
    }

    #[test]
    fn test_garbage_is_error() {
        assert!(flatedecode(b"not zlib at all").is_err());
    }
}
