//! folio - a lexer, stack parser and object model for PDF-style documents,
//! with lazy reference resolution, stream filters and text extraction.

pub mod api;
pub mod codec;
pub mod document;
pub mod error;
pub mod model;
pub mod parser;

pub use api::{ExtractOptions, TextItem, extract_text};
pub use document::{DanglingPolicy, PDFDocument, PDFPage, ParseOptions};
pub use error::{ErrorKind, PdfError, Result};
pub use model::{ObjKey, PDFDict, PDFObjRef, PDFObject, PDFStream};
pub use parser::{Command, Keyword, Token, lex, parse_content, parse_document};
