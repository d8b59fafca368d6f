//! RunLength stream decoder.

use crate::error::{PdfError, Result};

/// Decode RunLength-encoded data.
///
/// Format:
/// - Length byte 0-127: Copy next (length + 1) bytes literally
/// - Length byte 128: End of data (EOD marker)
/// - Length byte 129-255: Repeat next byte (257 - length) times
///
/// A run cut short by the end of input is an error; a missing EOD is not.
pub fn rldecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i];
        i += 1;

        match length {
            128 => break,
            0..=127 => {
                let count = length as usize + 1;
                let run = data.get(i..i + count).ok_or_else(|| {
                    PdfError::DecodeError(format!(
                        "RunLengthDecode: literal run of {count} bytes truncated at {i}"
                    ))
                })?;
                result.extend_from_slice(run);
                i += count;
            }
            129..=255 => {
                let byte = *data.get(i).ok_or_else(|| {
                    PdfError::DecodeError("RunLengthDecode: missing repeat byte".into())
                })?;
                i += 1;
                result.extend(std::iter::repeat_n(byte, 257 - length as usize));
            }
        }
    }

    Ok(result)
}
