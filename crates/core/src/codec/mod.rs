//! Stream filters.
//!
//! - `ascii85`: ASCII85 and ASCIIHex decoding
//! - `flate`: zlib/deflate decompression
//! - `lzw`: LZW decompression
//! - `runlength`: run-length decoding
//!
//! [`decode_stream`] checks a stream's `Length` and runs its filter chain.

pub mod ascii85;
pub mod flate;
pub mod lzw;
pub mod runlength;

pub use ascii85::{ascii85decode, asciihexdecode};
pub use flate::flatedecode;
pub use lzw::{lzwdecode, lzwdecode_with_earlychange};
pub use runlength::rldecode;

use crate::error::{PdfError, Result};
use crate::model::objects::{PDFObject, PDFStream};
use std::sync::Arc;
use tracing::trace;

/// A supported decoding filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Flate,
    Ascii85,
    AsciiHex,
    RunLength,
    Lzw,
}

impl Filter {
    /// Look a filter up by its full or abbreviated name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "FlateDecode" | "Fl" => Some(Filter::Flate),
            "ASCII85Decode" | "A85" => Some(Filter::Ascii85),
            "ASCIIHexDecode" | "AHx" => Some(Filter::AsciiHex),
            "RunLengthDecode" | "RL" => Some(Filter::RunLength),
            "LZWDecode" | "LZW" => Some(Filter::Lzw),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Filter::Flate => "FlateDecode",
            Filter::Ascii85 => "ASCII85Decode",
            Filter::AsciiHex => "ASCIIHexDecode",
            Filter::RunLength => "RunLengthDecode",
            Filter::Lzw => "LZWDecode",
        }
    }
}

/// Run one filter over `data`. `parms` is the filter's `DecodeParms`
/// dictionary, if any.
pub fn apply_filter(filter: Filter, data: &[u8], parms: Option<&PDFObject>) -> Result<Vec<u8>> {
    let predictor = int_parm(parms, "Predictor", 1)?;
    if predictor > 1 && matches!(filter, Filter::Flate | Filter::Lzw) {
        return Err(PdfError::UnsupportedFilter(format!(
            "{} with predictor {predictor}",
            filter.name()
        )));
    }
    match filter {
        Filter::Flate => flatedecode(data),
        Filter::Ascii85 => ascii85decode(data),
        Filter::AsciiHex => asciihexdecode(data),
        Filter::RunLength => rldecode(data),
        Filter::Lzw => lzwdecode_with_earlychange(data, int_parm(parms, "EarlyChange", 1)?),
    }
}

/// Check `Length` against the raw data, then apply every filter in order.
pub fn decode_stream(stream: &PDFStream) -> Result<Vec<u8>> {
    let raw = stream.rawdata();
    let length = stream
        .get("Length")
        .ok_or_else(|| PdfError::KeyError("Length".into()))?
        .resolve()?
        .as_int()?;
    if usize::try_from(length).ok() != Some(raw.len()) {
        return Err(PdfError::LengthMismatch {
            expected: length,
            actual: raw.len(),
        });
    }

    let chain = filter_chain(stream)?;
    let mut data = raw.to_vec();
    for (filter, parms) in chain {
        let decoded = apply_filter(filter, &data, parms.as_deref())?;
        trace!(
            filter = filter.name(),
            input = data.len(),
            output = decoded.len(),
            "applied filter"
        );
        data = decoded;
    }
    Ok(data)
}

type ChainLink = (Filter, Option<Arc<PDFObject>>);

/// Filters named by the stream, paired with their decode parameters.
fn filter_chain(stream: &PDFStream) -> Result<Vec<ChainLink>> {
    let Some(filter) = stream.get("Filter") else {
        return Ok(Vec::new());
    };
    let resolved = filter.resolve()?;
    let names = match resolved.as_ref() {
        PDFObject::Null => return Ok(Vec::new()),
        PDFObject::String(_) => vec![resolved.as_name()?],
        PDFObject::Array(items) => items
            .iter()
            .map(|item| item.resolve()?.as_name())
            .collect::<Result<Vec<_>>>()?,
        other => {
            return Err(PdfError::TypeError {
                expected: "filter name or array",
                got: other.type_name(),
            });
        }
    };

    let parms = match stream.get("DecodeParms") {
        Some(p) => Some(p.resolve()?),
        None => None,
    };

    names
        .into_iter()
        .enumerate()
        .map(|(i, name)| -> Result<ChainLink> {
            let filter =
                Filter::from_name(&name).ok_or_else(|| PdfError::UnsupportedFilter(name))?;
            let parm = match parms.as_deref() {
                Some(PDFObject::Array(list)) => match list.get(i) {
                    Some(p) => Some(p.resolve()?),
                    None => None,
                },
                Some(PDFObject::Dict(_)) => parms.clone(),
                _ => None,
            };
            Ok((filter, parm))
        })
        .collect()
}

fn int_parm(parms: Option<&PDFObject>, key: &str, default: i64) -> Result<i64> {
    match parms.and_then(|p| p.get(key)) {
        Some(value) => value.resolve()?.as_int(),
        None => Ok(default),
    }
}
