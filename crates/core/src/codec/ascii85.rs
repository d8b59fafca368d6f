//! ASCII85 and ASCIIHex stream decoders.

use crate::error::{PdfError, Result};

const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x00')
}

fn corrupt(filter: &str, msg: impl std::fmt::Display) -> PdfError {
    PdfError::DecodeError(format!("{filter}: {msg}"))
}

/// Decode ASCII85-encoded data.
///
/// Accepts an optional `<~` prefix and stops at `~>` (or end of input).
/// Whitespace is ignored and `z` stands for four zero bytes between groups.
pub fn ascii85decode(data: &[u8]) -> Result<Vec<u8>> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let mut out = Vec::with_capacity(data.len() / 5 * 4 + 4);
    let mut group = [0u8; 5];
    let mut filled = 0;

    let mut iter = data.iter().enumerate();
    while let Some((pos, &b)) = iter.next() {
        match b {
            b if is_whitespace(b) => {}
            b'~' => {
                if !matches!(iter.next(), Some((_, b'>'))) {
                    return Err(corrupt("ASCII85Decode", format!("'~' at {pos} not followed by '>'")));
                }
                break;
            }
            b'z' => {
                if filled != 0 {
                    return Err(corrupt("ASCII85Decode", format!("'z' inside a group at {pos}")));
                }
                out.extend_from_slice(&[0; 4]);
            }
            b'!'..=b'u' => {
                group[filled] = b - b'!';
                filled += 1;
                if filled == 5 {
                    out.extend_from_slice(&group_value(&group, pos)?.to_be_bytes());
                    filled = 0;
                }
            }
            _ => {
                return Err(corrupt(
                    "ASCII85Decode",
                    format!("invalid byte {:?} at {pos}", char::from(b)),
                ));
            }
        }
    }

    match filled {
        0 => {}
        1 => return Err(corrupt("ASCII85Decode", "final group has a single character")),
        n => {
            group[n..].fill(84);
            let bytes = group_value(&group, data.len())?.to_be_bytes();
            out.extend_from_slice(&bytes[..n - 1]);
        }
    }
    Ok(out)
}

fn group_value(group: &[u8; 5], pos: usize) -> Result<u32> {
    let value = group
        .iter()
        .fold(0u64, |acc, &digit| acc * 85 + u64::from(digit));
    u32::try_from(value).map_err(|_| corrupt("ASCII85Decode", format!("group overflow ending at {pos}")))
}

/// Decode ASCIIHex-encoded data.
///
/// Whitespace is ignored, `>` ends the data, and an odd final digit is
/// padded with zero.
pub fn asciihexdecode(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut pending: Option<u8> = None;
    for (pos, &b) in data.iter().enumerate() {
        let nibble = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            b'>' => break,
            b if is_whitespace(b) => continue,
            _ => {
                return Err(corrupt(
                    "ASCIIHexDecode",
                    format!("invalid byte {:?} at {pos}", char::from(b)),
                ));
            }
        };
        match pending.take() {
            Some(high) => out.push((high << 4) | nibble),
            None => pending = Some(nibble),
        }
    }
    if let Some(high) = pending {
        out.push(high << 4);
    }
    Ok(out)
}
