//! Whole-file grammar: indirect objects, references, xref tables, trailers.

use super::stack::{ContextKind, ParserState, StackItem, WordHandler};
use super::token::{Keyword, Token};
use crate::document::catalog::{DocStore, ObjectTable, PDFDocument, ParseOptions};
use crate::error::{PdfError, Result};
use crate::model::objects::{ObjKey, PDFObjRef, PDFObject, PDFStream};
use std::sync::{Arc, Weak};
use tracing::debug;

/// Builds the object table and trailer list of one document.
pub struct DocumentHandler {
    store: Arc<DocStore>,
    handle: Weak<DocStore>,
    table: ObjectTable,
}

impl DocumentHandler {
    pub fn new(options: ParseOptions) -> Self {
        let store = DocStore::new(options);
        let handle = Arc::downgrade(&store);
        Self {
            store,
            handle,
            table: ObjectTable::default(),
        }
    }

    /// Freeze what has been collected into a document.
    pub fn into_document(self) -> Result<PDFDocument> {
        let objects = self.table.objects.len();
        let trailers = self.table.trailers.len();
        if !self.store.freeze(self.table) {
            return Err(PdfError::parse(0, "document table already frozen"));
        }
        debug!(objects, trailers, "document parsed");
        Ok(PDFDocument::from_store(self.store))
    }

    fn reference(&self, state: &mut ParserState<'_>) -> Result<()> {
        let operands = state.pop_operands(2)?;
        let [objid, genno] = object_key(state, operands)?;
        state.push_value(PDFObject::Ref(PDFObjRef::new(
            objid,
            genno,
            self.handle.clone(),
        )));
        Ok(())
    }

    fn begin_object(state: &mut ParserState<'_>) -> Result<()> {
        let depth = state
            .len()
            .checked_sub(2)
            .filter(|&d| d >= state.frame_start())
            .ok_or_else(|| state.error("obj without object number and generation"))?;
        state.ctx_push(depth, ContextKind::Object)
    }

    fn end_object(&mut self, state: &mut ParserState<'_>) -> Result<()> {
        let mark = state.ctx_pop(ContextKind::Object)?;
        let mut items = state.drain_from(mark)?;
        if items.len() < 3 {
            return Err(state.error(format!(
                "object has {} items, expected number, generation and body",
                items.len()
            )));
        }
        let body = items.split_off(2);
        let [objid, genno] = object_key(state, items)?;
        let key = ObjKey::new(objid, genno);

        let value = match <[StackItem; 2]>::try_from(body) {
            Ok([
                StackItem::Value(PDFObject::Dict(attrs)),
                StackItem::Token(Token::StreamData(data)),
            ]) => {
                let mut stream = PDFStream::new(attrs, data);
                stream.objid = Some(key);
                PDFObject::Stream(Box::new(stream))
            }
            Ok(_) => {
                return Err(state.error(format!(
                    "object {key}: expected a dictionary followed by stream data"
                )));
            }
            Err(body) => match <[StackItem; 1]>::try_from(body) {
                Ok([item]) => item.into_value(state.index())?,
                Err(body) => {
                    return Err(state.error(format!(
                        "object {key} has {} body items",
                        body.len()
                    )));
                }
            },
        };

        let kind = value.type_name();
        if self.table.objects.insert(key, Arc::new(value)).is_some() {
            debug!(%key, kind, "object redefined, later definition wins");
        } else {
            debug!(%key, kind, "stored object");
        }
        Ok(())
    }

    /// Skip every `start count` subsection and its `offset gen n|f` entries.
    fn skip_xref(state: &mut ParserState<'_>) -> Result<()> {
        let mut offset = 0;
        let mut subsections = 0;
        let mut entries = 0;
        loop {
            let header = (state.peek(offset), state.peek(offset + 1));
            let count = match header {
                (Some(Token::Int(_)), Some(Token::Int(count))) => {
                    if subsections > 0 && state.peek(offset + 2) == Some(&Token::Word(Keyword::Obj))
                    {
                        break;
                    }
                    usize::try_from(*count).map_err(|_| {
                        state.error(format!("xref entry count must be non-negative, got {count}"))
                    })?
                }
                (None, _) | (Some(Token::Int(_)), None) if subsections == 0 => {
                    return Err(state.error("xref table truncated"));
                }
                _ if subsections == 0 => {
                    return Err(state.error("xref entry count must be an integer"));
                }
                _ => break,
            };
            offset += 2;
            for _ in 0..count {
                match (
                    state.peek(offset),
                    state.peek(offset + 1),
                    state.peek(offset + 2),
                ) {
                    (Some(Token::Int(_)), Some(Token::Int(_)), Some(Token::Word(flag)))
                        if is_xref_flag(flag) =>
                    {
                        offset += 3;
                    }
                    (_, _, None) => return Err(state.error("xref table truncated")),
                    _ => {
                        return Err(state.error(format!("malformed xref entry {entries}")));
                    }
                }
                entries += 1;
            }
            subsections += 1;
        }
        debug!(subsections, entries, "skipped xref table");
        state.advance(offset);
        Ok(())
    }

    fn end_trailer(&mut self, state: &mut ParserState<'_>) -> Result<()> {
        let mark = state.ctx_pop(ContextKind::Trailer)?;
        let items = state.drain_from(mark)?;
        match items.into_iter().next() {
            Some(StackItem::Value(PDFObject::Dict(dict))) => {
                debug!(entries = dict.len(), "trailer appended");
                self.table.trailers.push(dict);
            }
            Some(_) => return Err(state.error("trailer must be a dictionary")),
            None => return Err(state.error("empty trailer")),
        }
        if matches!(state.peek(0), Some(Token::Int(_))) {
            state.advance(1);
        }
        Ok(())
    }
}

impl WordHandler for DocumentHandler {
    fn on_word(&mut self, state: &mut ParserState<'_>, word: &Keyword) -> Result<()> {
        match word {
            Keyword::Stream | Keyword::EndStream => Ok(()),
            Keyword::R => self.reference(state),
            Keyword::Obj => Self::begin_object(state),
            Keyword::EndObj => self.end_object(state),
            Keyword::Xref => Self::skip_xref(state),
            Keyword::Trailer => state.ctx_push(state.len(), ContextKind::Trailer),
            Keyword::StartXref => self.end_trailer(state),
            other => Err(PdfError::UnknownKeyword {
                index: state.index(),
                keyword: other.text(),
            }),
        }
    }
}

fn is_xref_flag(word: &Keyword) -> bool {
    matches!(word, Keyword::Unknown(w) if w == b"n" || w == b"f")
}

/// Read `objid genno` from two stack items.
fn object_key(state: &ParserState<'_>, items: Vec<StackItem>) -> Result<[u64; 2]> {
    let mut key = [0u64; 2];
    for (slot, item) in key.iter_mut().zip(items) {
        *slot = match item {
            StackItem::Value(PDFObject::Int(n)) => u64::try_from(n).map_err(|_| {
                state.error(format!("object number must be non-negative, got {n}"))
            })?,
            StackItem::Value(other) => {
                return Err(state.error(format!(
                    "object number must be an integer, got {}",
                    other.type_name()
                )));
            }
            StackItem::Token(t) => {
                return Err(state.error(format!("object number must be an integer, got {t}")));
            }
        };
    }
    Ok(key)
}

/// Lex and parse a whole document.
pub fn parse_document(data: &[u8], options: &ParseOptions) -> Result<PDFDocument> {
    PDFDocument::parse(data, options)
}
