//! Lexical token model.

use bytes::Bytes;
use std::fmt;

/// Structural operators: the only punctuation that survives lexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    ArrayStart, // [
    ArrayEnd,   // ]
    DictStart,  // <<
    DictEnd,    // >>
}

impl Operator {
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::ArrayStart => "[",
            Operator::ArrayEnd => "]",
            Operator::DictStart => "<<",
            Operator::DictEnd => ">>",
        }
    }
}

/// Word token classification. Known words are zero-allocation variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Keyword {
    // Primitives
    True,
    False,
    Null,

    // Object structure
    Obj,
    EndObj,
    R,
    Stream,
    EndStream,
    Xref,
    Trailer,
    StartXref,

    // Text object
    BT,
    ET,

    // Text state and positioning
    Tf,
    Td,
    TD,
    Tm,
    TStar, // T*

    // Text showing
    Tj,
    TJ,
    Quote,       // '
    DoubleQuote, // "

    // Unknown (preserves original bytes)
    Unknown(Vec<u8>),
}

impl Keyword {
    pub fn from_bytes(b: &[u8]) -> Self {
        match b {
            b"true" => Keyword::True,
            b"false" => Keyword::False,
            b"null" => Keyword::Null,

            b"obj" => Keyword::Obj,
            b"endobj" => Keyword::EndObj,
            b"R" => Keyword::R,
            b"stream" => Keyword::Stream,
            b"endstream" => Keyword::EndStream,
            b"xref" => Keyword::Xref,
            b"trailer" => Keyword::Trailer,
            b"startxref" => Keyword::StartXref,

            b"BT" => Keyword::BT,
            b"ET" => Keyword::ET,

            b"Tf" => Keyword::Tf,
            b"Td" => Keyword::Td,
            b"TD" => Keyword::TD,
            b"Tm" => Keyword::Tm,
            b"T*" => Keyword::TStar,

            b"Tj" => Keyword::Tj,
            b"TJ" => Keyword::TJ,
            b"'" => Keyword::Quote,
            b"\"" => Keyword::DoubleQuote,

            _ => Keyword::Unknown(b.to_vec()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Keyword::True => b"true",
            Keyword::False => b"false",
            Keyword::Null => b"null",
            Keyword::Obj => b"obj",
            Keyword::EndObj => b"endobj",
            Keyword::R => b"R",
            Keyword::Stream => b"stream",
            Keyword::EndStream => b"endstream",
            Keyword::Xref => b"xref",
            Keyword::Trailer => b"trailer",
            Keyword::StartXref => b"startxref",
            Keyword::BT => b"BT",
            Keyword::ET => b"ET",
            Keyword::Tf => b"Tf",
            Keyword::Td => b"Td",
            Keyword::TD => b"TD",
            Keyword::Tm => b"Tm",
            Keyword::TStar => b"T*",
            Keyword::Tj => b"Tj",
            Keyword::TJ => b"TJ",
            Keyword::Quote => b"'",
            Keyword::DoubleQuote => b"\"",
            Keyword::Unknown(bytes) => bytes.as_slice(),
        }
    }

    /// The word as text (lossy for non-UTF-8 bytes).
    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }

    /// Whether this word paints text in a content stream.
    pub const fn is_show_text(&self) -> bool {
        matches!(
            self,
            Keyword::Tj | Keyword::TJ | Keyword::Quote | Keyword::DoubleQuote
        )
    }
}

/// Lexical token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Comment body (without the leading `%`)
    Meta(Vec<u8>),
    /// Integer value
    Int(i64),
    /// Floating point value
    Real(f64),
    /// Bare word: boolean/null keywords and operators
    Word(Keyword),
    /// Name (e.g., /Type), hex escapes already decoded
    Name(Vec<u8>),
    /// Hex string, already decoded to bytes
    HexString(Vec<u8>),
    /// Literal string, escapes already processed
    LiteralString(Vec<u8>),
    /// Raw bytes between `stream` and `endstream`
    StreamData(Bytes),
    /// Structural operator
    Operator(Operator),
}

/// A positioned token (byte offset, token)
pub type PosToken = (usize, Token);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Meta(buf) => write!(f, "Meta {:?}", String::from_utf8_lossy(buf)),
            Token::Int(n) => write!(f, "Int {n}"),
            Token::Real(n) => write!(f, "Real {n}"),
            Token::Word(kw) => write!(f, "Word {:?}", kw.text()),
            Token::Name(name) => write!(f, "Name {:?}", String::from_utf8_lossy(name)),
            Token::HexString(buf) => write!(f, "Hex {:?}", String::from_utf8_lossy(buf)),
            Token::LiteralString(buf) => {
                write!(f, "String {:?}", String::from_utf8_lossy(buf))
            }
            Token::StreamData(buf) => write!(f, "Stream ({} bytes)", buf.len()),
            Token::Operator(op) => f.write_str(op.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_from_bytes_known() {
        assert_eq!(Keyword::from_bytes(b"obj"), Keyword::Obj);
        assert_eq!(Keyword::from_bytes(b"startxref"), Keyword::StartXref);
        assert_eq!(Keyword::from_bytes(b"T*"), Keyword::TStar);
        assert_eq!(Keyword::from_bytes(b"'"), Keyword::Quote);
    }

    #[test]
    fn test_keyword_from_bytes_unknown() {
        let kw = Keyword::from_bytes(b"re");
        assert_eq!(kw, Keyword::Unknown(b"re".to_vec()));
        assert_eq!(kw.as_bytes(), b"re");
    }

    #[test]
    fn test_keyword_round_trips_through_bytes() {
        for word in [
            &b"true"[..],
            b"endobj",
            b"R",
            b"xref",
            b"BT",
            b"Tm",
            b"TJ",
            b"\"",
        ] {
            assert_eq!(Keyword::from_bytes(word).as_bytes(), word);
        }
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Int(-3).to_string(), "Int -3");
        assert_eq!(Token::Word(Keyword::Obj).to_string(), "Word \"obj\"");
        assert_eq!(
            Token::StreamData(Bytes::from_static(b"abc")).to_string(),
            "Stream (3 bytes)"
        );
        assert_eq!(Token::Operator(Operator::DictStart).to_string(), "<<");
    }
}
