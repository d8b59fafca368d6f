//! Byte-level tokenizer.
//!
//! A single left-to-right pass driven by an explicit finite-state machine.
//! The machine only looks ahead in two places: deciding whether a `#` in a
//! name starts a hex escape, and scanning past whitespace inside stream data
//! to test for the `endstream` keyword.

use super::token::{Keyword, Operator, PosToken, Token};
use crate::error::{PdfError, Result};
use bytes::Bytes;

/// Lexer states. `Start` is the only state the machine may rest in between
/// tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexMode {
    Start,
    Meta,
    Integer,
    Real,
    Word,
    AngleOpen,
    AngleClose,
    Hex,
    Name,
    LiteralString,
    StringEscape,
    StreamAwaitData,
    StreamData,
}

impl LexMode {
    const fn name(self) -> &'static str {
        match self {
            LexMode::Start => "start",
            LexMode::Meta => "comment",
            LexMode::Integer => "integer",
            LexMode::Real => "real",
            LexMode::Word => "word",
            LexMode::AngleOpen => "'<'",
            LexMode::AngleClose => "'>'",
            LexMode::Hex => "hex string",
            LexMode::Name => "name",
            LexMode::LiteralString => "literal string",
            LexMode::StringEscape => "string escape",
            LexMode::StreamAwaitData => "stream start",
            LexMode::StreamData => "stream data",
        }
    }
}

/// Output of a lexing pass: every token recognized before the first error,
/// plus that error if there was one.
#[derive(Debug)]
pub struct Lexed {
    pub tokens: Vec<PosToken>,
    pub error: Option<PdfError>,
}

impl Lexed {
    /// Discard partial output on failure.
    pub fn into_result(self) -> Result<Vec<PosToken>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.tokens),
        }
    }
}

/// Tokenize a whole buffer.
pub fn lex(data: &[u8]) -> Lexed {
    Lexer::new(data).run()
}

/// Finite-state tokenizer over a borrowed buffer.
pub struct Lexer<'a> {
    data: &'a [u8],
    pos: usize,
    mode: LexMode,
    /// Offset where the token being built started
    token_pos: usize,
    buf: Vec<u8>,
    /// Parenthesis nesting inside a literal string
    depth: usize,
    tokens: Vec<PosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            mode: LexMode::Start,
            token_pos: 0,
            buf: Vec::new(),
            depth: 0,
            tokens: Vec::new(),
        }
    }

    /// Run the machine to the end of input or the first error.
    pub fn run(mut self) -> Lexed {
        let error = self.scan().err();
        Lexed {
            tokens: self.tokens,
            error,
        }
    }

    fn scan(&mut self) -> Result<()> {
        while let Some(&c) = self.data.get(self.pos) {
            self.step(c)?;
        }
        self.finish()
    }

    /// Check if byte is whitespace
    const fn is_whitespace(b: u8) -> bool {
        matches!(b, b' ' | b'\t' | b'\r' | b'\n')
    }

    /// Check if byte is delimiter
    const fn is_delimiter(b: u8) -> bool {
        matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
    }

    const fn is_word_byte(b: u8) -> bool {
        b.is_ascii_alphanumeric() || b == b'*'
    }

    fn begin(&mut self, mode: LexMode) {
        self.mode = mode;
        self.token_pos = self.pos;
        self.buf.clear();
    }

    fn emit(&mut self, token: Token) {
        self.tokens.push((self.token_pos, token));
        self.mode = LexMode::Start;
    }

    fn emit_at(&mut self, pos: usize, token: Token) {
        self.tokens.push((pos, token));
    }

    fn unexpected(&self, c: u8) -> PdfError {
        PdfError::Lex {
            pos: self.pos,
            byte: char::from(c),
            mode: self.mode.name(),
        }
    }

    fn step(&mut self, c: u8) -> Result<()> {
        match self.mode {
            LexMode::Start => self.step_start(c),
            LexMode::Meta => {
                if c == b'\r' || c == b'\n' {
                    let body = std::mem::take(&mut self.buf);
                    self.emit(Token::Meta(body));
                } else {
                    self.buf.push(c);
                    self.pos += 1;
                }
                Ok(())
            }
            LexMode::Integer => {
                if c.is_ascii_digit() {
                    self.buf.push(c);
                    self.pos += 1;
                } else if c == b'.' {
                    self.buf.push(c);
                    self.mode = LexMode::Real;
                    self.pos += 1;
                } else {
                    self.finish_integer()?;
                }
                Ok(())
            }
            LexMode::Real => {
                if c.is_ascii_digit() {
                    self.buf.push(c);
                    self.pos += 1;
                    Ok(())
                } else if c == b'.' {
                    Err(self.unexpected(c))
                } else {
                    self.finish_real()
                }
            }
            LexMode::Word => {
                if Self::is_word_byte(c) {
                    self.buf.push(c);
                    self.pos += 1;
                } else {
                    self.finish_word();
                }
                Ok(())
            }
            LexMode::AngleOpen => {
                match c {
                    b'<' => {
                        self.pos += 1;
                        self.emit(Token::Operator(Operator::DictStart));
                    }
                    b'>' => {
                        self.pos += 1;
                        self.emit(Token::HexString(Vec::new()));
                    }
                    c if c.is_ascii_hexdigit() => self.mode = LexMode::Hex,
                    _ => return Err(self.unexpected(c)),
                }
                Ok(())
            }
            LexMode::AngleClose => {
                if c != b'>' {
                    return Err(self.unexpected(c));
                }
                self.pos += 1;
                self.emit(Token::Operator(Operator::DictEnd));
                Ok(())
            }
            LexMode::Hex => {
                if c.is_ascii_hexdigit() {
                    self.buf.push(c);
                    self.pos += 1;
                    Ok(())
                } else if c == b'>' {
                    let decoded = decode_hex_digits(&self.buf).ok_or_else(|| {
                        PdfError::TokenError {
                            pos: self.token_pos,
                            msg: format!("odd number of hex digits ({})", self.buf.len()),
                        }
                    })?;
                    self.pos += 1;
                    self.emit(Token::HexString(decoded));
                    Ok(())
                } else {
                    Err(self.unexpected(c))
                }
            }
            LexMode::Name => {
                if c == b'#' {
                    let h1 = self.data.get(self.pos + 1).copied().and_then(hex_value);
                    let h2 = self.data.get(self.pos + 2).copied().and_then(hex_value);
                    if let (Some(hi), Some(lo)) = (h1, h2) {
                        self.buf.push((hi << 4) | lo);
                        self.pos += 3;
                    } else {
                        // Invalid hex escape: '#' is dropped, following bytes kept
                        self.pos += 1;
                    }
                } else if Self::is_whitespace(c) || Self::is_delimiter(c) {
                    let name = std::mem::take(&mut self.buf);
                    self.emit(Token::Name(name));
                } else {
                    self.buf.push(c);
                    self.pos += 1;
                }
                Ok(())
            }
            LexMode::LiteralString => {
                self.pos += 1;
                match c {
                    b'\\' => self.mode = LexMode::StringEscape,
                    b'(' => {
                        self.depth += 1;
                        self.buf.push(c);
                    }
                    b')' => {
                        self.depth -= 1;
                        if self.depth == 0 {
                            let body = std::mem::take(&mut self.buf);
                            self.emit(Token::LiteralString(body));
                        } else {
                            self.buf.push(c);
                        }
                    }
                    _ => self.buf.push(c),
                }
                Ok(())
            }
            LexMode::StringEscape => {
                self.pos += 1;
                match c {
                    // Line continuation
                    b'\r' => {
                        if self.data.get(self.pos) == Some(&b'\n') {
                            self.pos += 1;
                        }
                    }
                    b'\n' => {}
                    // Any other escaped byte stands for itself
                    _ => self.buf.push(c),
                }
                self.mode = LexMode::LiteralString;
                Ok(())
            }
            LexMode::StreamAwaitData => {
                if Self::is_whitespace(c) {
                    self.pos += 1;
                } else if self.data[self.pos..].starts_with(b"endstream") {
                    self.token_pos = self.pos;
                    self.emit(Token::StreamData(Bytes::new()));
                } else {
                    self.begin(LexMode::StreamData);
                }
                Ok(())
            }
            LexMode::StreamData => {
                if Self::is_whitespace(c) {
                    self.scan_for_endstream()
                } else {
                    self.pos += 1;
                    Ok(())
                }
            }
        }
    }

    fn step_start(&mut self, c: u8) -> Result<()> {
        match c {
            c if Self::is_whitespace(c) => self.pos += 1,
            b'%' => {
                self.begin(LexMode::Meta);
                self.pos += 1;
            }
            b'-' => {
                self.begin(LexMode::Integer);
                self.buf.push(c);
                self.pos += 1;
            }
            b'.' => {
                self.begin(LexMode::Real);
                self.buf.push(c);
                self.pos += 1;
            }
            c if c.is_ascii_digit() => self.begin(LexMode::Integer),
            c if c.is_ascii_alphabetic() => self.begin(LexMode::Word),
            b'\'' | b'"' => {
                self.begin(LexMode::Word);
                self.pos += 1;
                self.emit(Token::Word(Keyword::from_bytes(&[c])));
            }
            b'<' => {
                self.begin(LexMode::AngleOpen);
                self.pos += 1;
            }
            b'>' => {
                self.begin(LexMode::AngleClose);
                self.pos += 1;
            }
            b'[' => {
                self.emit_at(self.pos, Token::Operator(Operator::ArrayStart));
                self.pos += 1;
            }
            b']' => {
                self.emit_at(self.pos, Token::Operator(Operator::ArrayEnd));
                self.pos += 1;
            }
            b'/' => {
                self.begin(LexMode::Name);
                self.pos += 1;
            }
            b'(' => {
                self.begin(LexMode::LiteralString);
                self.depth = 1;
                self.pos += 1;
            }
            _ => return Err(self.unexpected(c)),
        }
        Ok(())
    }

    /// Called on a whitespace byte inside stream data. Skips the whole
    /// whitespace run and checks whether `endstream` follows; if not, the run
    /// is stream content and scanning resumes after it.
    fn scan_for_endstream(&mut self) -> Result<()> {
        let mut ahead = self.pos + 1;
        while ahead < self.data.len() && Self::is_whitespace(self.data[ahead]) {
            ahead += 1;
        }
        if ahead >= self.data.len() {
            return Err(PdfError::TruncatedToken {
                pos: self.token_pos,
                mode: LexMode::StreamData.name(),
            });
        }
        if self.data[ahead..].starts_with(b"endstream") {
            let payload = Bytes::copy_from_slice(&self.data[self.token_pos..self.pos]);
            self.emit(Token::StreamData(payload));
        }
        self.pos = ahead;
        Ok(())
    }

    fn finish_integer(&mut self) -> Result<()> {
        let text = std::str::from_utf8(&self.buf).unwrap_or_default();
        let val: i64 = text.parse().map_err(|_| PdfError::TokenError {
            pos: self.token_pos,
            msg: format!("invalid int: {text:?}"),
        })?;
        self.emit(Token::Int(val));
        Ok(())
    }

    fn finish_real(&mut self) -> Result<()> {
        let text = std::str::from_utf8(&self.buf).unwrap_or_default();
        let val: f64 = text.parse().map_err(|_| PdfError::TokenError {
            pos: self.token_pos,
            msg: format!("invalid real: {text:?}"),
        })?;
        self.emit(Token::Real(val));
        Ok(())
    }

    fn finish_word(&mut self) {
        let keyword = Keyword::from_bytes(&self.buf);
        let opens_stream = keyword == Keyword::Stream;
        self.emit(Token::Word(keyword));
        if opens_stream {
            self.mode = LexMode::StreamAwaitData;
        }
    }

    /// End of input: flush tokens that a separator would have ended, fail on
    /// tokens that need an explicit terminator.
    fn finish(&mut self) -> Result<()> {
        match self.mode {
            LexMode::Start => {}
            LexMode::Meta => {
                let body = std::mem::take(&mut self.buf);
                self.emit(Token::Meta(body));
            }
            LexMode::Integer => self.finish_integer()?,
            LexMode::Real => self.finish_real()?,
            LexMode::Word => self.finish_word(),
            LexMode::Name => {
                let name = std::mem::take(&mut self.buf);
                self.emit(Token::Name(name));
            }
            _ => {}
        }
        match self.mode {
            LexMode::Start => Ok(()),
            mode => Err(PdfError::TruncatedToken {
                pos: self.token_pos,
                mode: mode.name(),
            }),
        }
    }
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Decode an even-length run of hex digits.
fn decode_hex_digits(digits: &[u8]) -> Option<Vec<u8>> {
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| Some((hex_value(pair[0])? << 4) | hex_value(pair[1])?))
        .collect()
}

/// Map raw name/string bytes to a dictionary key, one char per byte.
pub(crate) fn name_from_bytes(bytes: &[u8]) -> String {
    let mut name = String::with_capacity(bytes.len());
    for &b in bytes {
        name.push(char::from(b));
    }
    name
}
