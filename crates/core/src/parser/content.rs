//! Content-stream grammar: operands followed by an operator word.

use super::lexer::lex;
use super::stack::{ParserState, StackParser, WordHandler};
use super::token::Keyword;
use crate::error::Result;
use crate::model::objects::PDFObject;

/// One content-stream operator with the operands collected before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub keyword: Keyword,
    pub operands: Vec<PDFObject>,
}

impl Command {
    /// The first string operand, if any.
    pub fn string_operand(&self) -> Option<&[u8]> {
        self.operands.iter().find_map(|op| op.as_string().ok())
    }
}

/// Turns every word into a [`Command`] holding the whole operand stack.
#[derive(Debug, Default)]
pub struct ContentHandler {
    commands: Vec<Command>,
}

impl ContentHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

impl WordHandler for ContentHandler {
    fn on_word(&mut self, state: &mut ParserState<'_>, word: &Keyword) -> Result<()> {
        if let Some(kind) = state.open_context() {
            return Err(state.error(format!(
                "operator {:?} inside an open {}",
                word.text(),
                kind.name()
            )));
        }
        let index = state.index();
        let operands = state
            .drain_from(0)?
            .into_iter()
            .map(|item| item.into_value(index))
            .collect::<Result<Vec<_>>>()?;
        self.commands.push(Command {
            keyword: word.clone(),
            operands,
        });
        Ok(())
    }
}

/// Lex and parse decoded content-stream bytes into commands.
pub fn parse_content(data: &[u8]) -> Result<Vec<Command>> {
    let tokens = lex(data).into_result()?;
    let mut handler = ContentHandler::new();
    StackParser::new(&tokens).run(&mut handler)?;
    Ok(handler.into_commands())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;

    #[test]
    fn test_operands_belong_to_next_word() {
        let cmds = parse_content(b"/F1 12 Tf 1 0 0 1 72 700 Tm (Hi) Tj").unwrap();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0].keyword, Keyword::Tf);
        assert_eq!(
            cmds[0].operands,
            vec![PDFObject::String(b"F1".to_vec()), PDFObject::Int(12)]
        );
        assert_eq!(cmds[1].operands.len(), 6);
        assert_eq!(cmds[2].string_operand(), Some(&b"Hi"[..]));
    }

    #[test]
    fn test_word_without_operands() {
        let cmds = parse_content(b"BT ET").unwrap();
        assert_eq!(cmds.len(), 2);
        assert!(cmds.iter().all(|c| c.operands.is_empty()));
    }

    #[test]
    fn test_word_inside_array_is_error() {
        assert!(matches!(
            parse_content(b"[(a) q (b)] TJ"),
            Err(PdfError::Parse { .. })
        ));
    }
}
