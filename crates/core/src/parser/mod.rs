//! Lexing and parsing.
//!
//! - `token`: token model
//! - `lexer`: finite-state tokenizer
//! - `stack`: generic stack parser and the `WordHandler` seam
//! - `document`: whole-file grammar (objects, xref, trailers)
//! - `content`: content-stream grammar (commands)

pub mod content;
pub mod document;
pub mod lexer;
pub mod stack;
pub mod token;

pub use content::{Command, ContentHandler, parse_content};
pub use document::{DocumentHandler, parse_document};
pub use lexer::{Lexed, Lexer, lex};
pub use stack::{ContextKind, ParserState, StackItem, StackParser, WordHandler, parse};
pub use token::{Keyword, Operator, PosToken, Token};
