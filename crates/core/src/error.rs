//! Error types for folio document parsing.

use thiserror::Error;

/// Primary error type for lexing, parsing and decoding.
#[derive(Error, Debug)]
pub enum PdfError {
    #[error("unexpected {byte:?} at position {pos} in {mode} mode")]
    Lex {
        pos: usize,
        byte: char,
        mode: &'static str,
    },

    #[error("invalid token at position {pos}: {msg}")]
    TokenError { pos: usize, msg: String },

    #[error("truncated token: input ended in {mode} mode (token started at {pos})")]
    TruncatedToken { pos: usize, mode: &'static str },

    #[error("parse error at token {index}: {msg}")]
    Parse { index: usize, msg: String },

    #[error("unknown keyword at token {index}: {keyword}")]
    UnknownKeyword { index: usize, keyword: String },

    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {0}")]
    KeyError(String),

    #[error("missing object reference: {objid} {genno} R")]
    Reference { objid: u64, genno: u64 },

    #[error("circular reference detected for {objid} {genno} R")]
    CircularReference { objid: u64, genno: u64 },

    #[error("reference outlived its document")]
    DocumentGone,

    #[error("stream length mismatch: /Length is {expected}, data is {actual} bytes")]
    LengthMismatch { expected: i64, actual: usize },

    #[error("unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("page tree error: {0}")]
    PageTree(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Broad category of a [`PdfError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Type,
    Reference,
    Filter,
    Io,
}

impl PdfError {
    /// Error category, for callers that only care which stage failed.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Lex { .. } | Self::TokenError { .. } | Self::TruncatedToken { .. } => {
                ErrorKind::Lex
            }
            Self::Parse { .. } | Self::UnknownKeyword { .. } | Self::PageTree(_) => {
                ErrorKind::Parse
            }
            Self::TypeError { .. } | Self::KeyError(_) => ErrorKind::Type,
            Self::Reference { .. } | Self::CircularReference { .. } | Self::DocumentGone => {
                ErrorKind::Reference
            }
            Self::LengthMismatch { .. } | Self::UnsupportedFilter(_) | Self::DecodeError(_) => {
                ErrorKind::Filter
            }
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn parse(index: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            index,
            msg: msg.into(),
        }
    }
}

/// Convenience Result type alias for PdfError.
pub type Result<T> = std::result::Result<T, PdfError>;
