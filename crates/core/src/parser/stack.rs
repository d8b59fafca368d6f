//! Generic stack parser.
//!
//! Reduces the format-independent constructs (primitives, arrays,
//! dictionaries) and hands every other word to a [`WordHandler`]. The handler
//! gets the whole [`ParserState`], so it can rewrite the operand stack, push
//! and pop context marks, and move the token cursor.

use super::lexer::name_from_bytes;
use super::token::{Keyword, Operator, PosToken, Token};
use crate::error::{PdfError, Result};
use crate::model::objects::{PDFDict, PDFObject};

/// Operand stack entry: a reduced value, or a raw token a handler still has
/// to interpret (stream data).
#[derive(Debug, Clone, PartialEq)]
pub enum StackItem {
    Token(Token),
    Value(PDFObject),
}

impl StackItem {
    pub fn as_value(&self) -> Option<&PDFObject> {
        match self {
            StackItem::Value(v) => Some(v),
            StackItem::Token(_) => None,
        }
    }

    /// Require a reduced value; `index` is the token index used in the error.
    pub fn into_value(self, index: usize) -> Result<PDFObject> {
        match self {
            StackItem::Value(v) => Ok(v),
            StackItem::Token(t) => Err(PdfError::parse(
                index,
                format!("expected a value, found raw token {t}"),
            )),
        }
    }
}

/// What opened a context mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Array,
    Dict,
    Object,
    Trailer,
}

impl ContextKind {
    pub const fn name(self) -> &'static str {
        match self {
            ContextKind::Array => "array",
            ContextKind::Dict => "dictionary",
            ContextKind::Object => "object",
            ContextKind::Trailer => "trailer",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ContextMark {
    depth: usize,
    kind: ContextKind,
}

/// Mutable state of one parse invocation.
#[derive(Debug)]
pub struct ParserState<'t> {
    tokens: &'t [PosToken],
    /// Next token to read
    pos: usize,
    /// Token currently being reduced
    index: usize,
    stack: Vec<StackItem>,
    context: Vec<ContextMark>,
}

impl<'t> ParserState<'t> {
    pub fn new(tokens: &'t [PosToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            index: 0,
            stack: Vec::new(),
            context: Vec::new(),
        }
    }

    pub fn tokens(&self) -> &'t [PosToken] {
        self.tokens
    }

    /// Index of the next unread token.
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Index of the token being reduced.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Byte offset of the token being reduced.
    pub fn offset(&self) -> usize {
        self.tokens.get(self.index).map_or(0, |(off, _)| *off)
    }

    /// Look at an unread token without consuming it (`k = 0` is the next one).
    pub fn peek(&self, k: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + k).map(|(_, t)| t)
    }

    /// Skip `n` unread tokens.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.tokens.len());
    }

    pub fn stack(&self) -> &[StackItem] {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn push(&mut self, item: StackItem) {
        self.stack.push(item);
    }

    pub fn push_value(&mut self, value: PDFObject) {
        self.stack.push(StackItem::Value(value));
    }

    /// Pop the top item, which must be a reduced value.
    pub fn pop_value(&mut self) -> Result<PDFObject> {
        let item = self
            .stack
            .pop()
            .ok_or_else(|| self.error("stack underflow"))?;
        item.into_value(self.index)
    }

    /// Stack depth where the innermost open context begins (0 at top level).
    pub fn frame_start(&self) -> usize {
        self.context.last().map_or(0, |m| m.depth)
    }

    /// Pop the top `n` items, which must all belong to the innermost context.
    pub fn pop_operands(&mut self, n: usize) -> Result<Vec<StackItem>> {
        let start = self
            .stack
            .len()
            .checked_sub(n)
            .filter(|&start| start >= self.frame_start())
            .ok_or_else(|| self.error(format!("stack underflow: need {n} operands")))?;
        Ok(self.stack.split_off(start))
    }

    /// Remove and return everything from `start` up.
    pub fn drain_from(&mut self, start: usize) -> Result<Vec<StackItem>> {
        if start > self.stack.len() {
            return Err(self.error(format!(
                "stack underflow: mark at {start}, stack holds {}",
                self.stack.len()
            )));
        }
        Ok(self.stack.split_off(start))
    }

    /// Open a context whose items start at stack `depth`.
    pub fn ctx_push(&mut self, depth: usize, kind: ContextKind) -> Result<()> {
        if depth > self.stack.len() {
            return Err(self.error(format!(
                "{} mark below the stack bottom",
                kind.name()
            )));
        }
        self.context.push(ContextMark { depth, kind });
        Ok(())
    }

    /// Close the innermost context, which must be of `kind`; returns its depth.
    pub fn ctx_pop(&mut self, kind: ContextKind) -> Result<usize> {
        match self.context.last().copied() {
            None => Err(self.error(format!(
                "no open context to close (expected {})",
                kind.name()
            ))),
            Some(mark) if mark.kind != kind => Err(self.error(format!(
                "cannot close {} while {} is open",
                kind.name(),
                mark.kind.name()
            ))),
            Some(mark) => {
                self.context.pop();
                if mark.depth > self.stack.len() {
                    return Err(self.error("context mark above the stack top"));
                }
                Ok(mark.depth)
            }
        }
    }

    /// Number of open contexts.
    pub fn context_depth(&self) -> usize {
        self.context.len()
    }

    /// Kind of the innermost open context.
    pub fn open_context(&self) -> Option<ContextKind> {
        self.context.last().map(|m| m.kind)
    }

    /// Parse error positioned at the current token.
    pub fn error(&self, msg: impl Into<String>) -> PdfError {
        PdfError::parse(self.index, msg)
    }
}

/// Grammar-specific word handling plugged into the stack parser.
pub trait WordHandler {
    /// Called once before the first token is reduced.
    fn connect(&mut self, _state: &ParserState<'_>) {}

    /// Handle a word the generic parser does not reduce itself.
    fn on_word(&mut self, state: &mut ParserState<'_>, word: &Keyword) -> Result<()>;

    /// Called after the last token, before open contexts are checked.
    fn finish(&mut self, _state: &mut ParserState<'_>) -> Result<()> {
        Ok(())
    }
}

/// Drives a [`WordHandler`] over a token sequence.
pub struct StackParser<'t> {
    state: ParserState<'t>,
}

impl<'t> StackParser<'t> {
    pub fn new(tokens: &'t [PosToken]) -> Self {
        Self {
            state: ParserState::new(tokens),
        }
    }

    /// Reduce every token, then fail if any context is still open.
    pub fn run<H: WordHandler>(mut self, handler: &mut H) -> Result<()> {
        let state = &mut self.state;
        let tokens = state.tokens;
        handler.connect(state);
        while let Some((_, token)) = tokens.get(state.pos) {
            state.index = state.pos;
            state.pos += 1;
            reduce(state, token, handler)?;
        }
        state.index = tokens.len();
        handler.finish(state)?;
        match state.open_context() {
            Some(kind) => Err(state.error(format!("unterminated {}", kind.name()))),
            None => Ok(()),
        }
    }
}

/// Parse a token sequence with the given handler.
pub fn parse<H: WordHandler>(tokens: &[PosToken], handler: &mut H) -> Result<()> {
    StackParser::new(tokens).run(handler)
}

fn reduce<H: WordHandler>(
    state: &mut ParserState<'_>,
    token: &Token,
    handler: &mut H,
) -> Result<()> {
    match token {
        Token::Meta(_) => {}
        Token::Int(n) => state.push_value(PDFObject::Int(*n)),
        Token::Real(n) => state.push_value(PDFObject::Real(*n)),
        Token::Name(s) | Token::LiteralString(s) | Token::HexString(s) => {
            state.push_value(PDFObject::String(s.clone()));
        }
        Token::StreamData(_) => state.push(StackItem::Token(token.clone())),
        Token::Operator(Operator::ArrayStart) => state.ctx_push(state.len(), ContextKind::Array)?,
        Token::Operator(Operator::DictStart) => state.ctx_push(state.len(), ContextKind::Dict)?,
        Token::Operator(Operator::ArrayEnd) => {
            let mark = state.ctx_pop(ContextKind::Array)?;
            let index = state.index;
            let items = state
                .drain_from(mark)?
                .into_iter()
                .map(|item| item.into_value(index))
                .collect::<Result<Vec<_>>>()?;
            state.push_value(PDFObject::Array(items));
        }
        Token::Operator(Operator::DictEnd) => {
            let mark = state.ctx_pop(ContextKind::Dict)?;
            let items = state.drain_from(mark)?;
            let dict = build_dict(state, items)?;
            state.push_value(PDFObject::Dict(dict));
        }
        Token::Word(Keyword::True) => state.push_value(PDFObject::Bool(true)),
        Token::Word(Keyword::False) => state.push_value(PDFObject::Bool(false)),
        Token::Word(Keyword::Null) => state.push_value(PDFObject::Null),
        Token::Word(word) => handler.on_word(state, word)?,
    }
    Ok(())
}

fn build_dict(state: &ParserState<'_>, items: Vec<StackItem>) -> Result<PDFDict> {
    if items.len() % 2 != 0 {
        return Err(state.error(format!(
            "dictionary has an odd number of items ({})",
            items.len()
        )));
    }
    let mut dict = PDFDict::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        let key = match key {
            StackItem::Value(PDFObject::String(s)) => name_from_bytes(&s),
            StackItem::Value(other) => {
                return Err(state.error(format!(
                    "dictionary key must be a string, got {}",
                    other.type_name()
                )));
            }
            StackItem::Token(t) => {
                return Err(state.error(format!("dictionary key must be a string, got {t}")));
            }
        };
        dict.insert(key, value.into_value(state.index)?);
    }
    Ok(dict)
}
