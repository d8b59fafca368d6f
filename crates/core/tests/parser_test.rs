//! Tests for the generic stack parser and the `WordHandler` seam.

use folio_core::error::{PdfError, Result};
use folio_core::model::PDFObject;
use folio_core::parser::{Keyword, ParserState, StackItem, WordHandler, lex, parse};

/// A toy grammar: `add` sums the two integers on top of the stack, `dup`
/// duplicates the top value. Whatever is left on the stack is kept.
#[derive(Default)]
struct Calculator {
    connected: bool,
    result: Vec<PDFObject>,
}

impl WordHandler for Calculator {
    fn connect(&mut self, state: &ParserState<'_>) {
        assert!(state.is_empty());
        self.connected = true;
    }

    fn on_word(&mut self, state: &mut ParserState<'_>, word: &Keyword) -> Result<()> {
        match word.as_bytes() {
            b"add" => {
                let b = state.pop_value()?.as_int()?;
                let a = state.pop_value()?.as_int()?;
                state.push_value(PDFObject::Int(a + b));
                Ok(())
            }
            b"dup" => {
                let top = state.pop_value()?;
                state.push_value(top.clone());
                state.push_value(top);
                Ok(())
            }
            _ => Err(state.error(format!("unknown word {}", word.text()))),
        }
    }

    fn finish(&mut self, state: &mut ParserState<'_>) -> Result<()> {
        self.result = state
            .drain_from(0)?
            .into_iter()
            .filter_map(|item| match item {
                StackItem::Value(v) => Some(v),
                StackItem::Token(_) => None,
            })
            .collect();
        Ok(())
    }
}

fn run(data: &[u8]) -> Result<Vec<PDFObject>> {
    let tokens = lex(data).into_result()?;
    let mut calc = Calculator::default();
    parse(&tokens, &mut calc)?;
    assert!(calc.connected);
    Ok(calc.result)
}

#[test]
fn test_handler_drives_the_stack() {
    assert_eq!(run(b"1 2 add 3 add dup").unwrap(), vec![PDFObject::Int(6), PDFObject::Int(6)]);
}

#[test]
fn test_handler_words_inside_arrays() {
    assert_eq!(
        run(b"[1 2 add (x)]").unwrap(),
        vec![PDFObject::Array(vec![
            PDFObject::Int(3),
            PDFObject::String(b"x".to_vec()),
        ])]
    );
}

#[test]
fn test_handler_error_aborts_parse() {
    let err = run(b"1 2 mul").unwrap_err();
    assert!(matches!(err, PdfError::Parse { index: 2, .. }));
}

#[test]
fn test_array_preserves_order_and_length() {
    let values = run(b"[5 4.5 /N (s) <ff> true null [ ] << >>]").unwrap();
    let PDFObject::Array(items) = &values[0] else {
        panic!("expected array, got {values:?}");
    };
    assert_eq!(items.len(), 9);
    assert_eq!(items[0], PDFObject::Int(5));
    assert_eq!(items[1], PDFObject::Real(4.5));
    assert_eq!(items[2], PDFObject::String(b"N".to_vec()));
    assert_eq!(items[4], PDFObject::String(vec![0xff]));
    assert_eq!(items[6], PDFObject::Null);
    assert_eq!(items[7], PDFObject::Array(Vec::new()));
    assert!(matches!(&items[8], PDFObject::Dict(d) if d.is_empty()));
}

#[test]
fn test_dictionary_pairs() {
    let values = run(b"<< /Type /Page /Count 3 /Kids [1 2] /Sub << /A true >> >>").unwrap();
    let dict = values[0].as_dict().unwrap();
    assert_eq!(dict.len(), 4);
    assert_eq!(dict["Type"], PDFObject::String(b"Page".to_vec()));
    assert_eq!(dict["Count"], PDFObject::Int(3));
    assert_eq!(dict["Kids"].as_array().unwrap().len(), 2);
    assert_eq!(dict["Sub"].get("A"), Some(&PDFObject::Bool(true)));
}

#[test]
fn test_string_keys_are_accepted() {
    let values = run(b"<< (lit) 1 <6869> 2 >>").unwrap();
    let dict = values[0].as_dict().unwrap();
    assert_eq!(dict["lit"], PDFObject::Int(1));
    assert_eq!(dict["hi"], PDFObject::Int(2));
}

#[test]
fn test_odd_dictionary_is_error() {
    let err = run(b"<< /A 1 /B >>").unwrap_err();
    assert!(matches!(err, PdfError::Parse { .. }));
    assert!(err.to_string().contains("odd number"));
}

#[test]
fn test_unbalanced_contexts() {
    assert!(matches!(run(b"1 ]"), Err(PdfError::Parse { .. })));
    assert!(matches!(run(b"<< /A [ >>"), Err(PdfError::Parse { .. })));
    assert!(matches!(run(b"[ [ ]"), Err(PdfError::Parse { .. })));
}

#[test]
fn test_comments_are_discarded() {
    assert_eq!(
        run(b"1 % one\n2 %two\nadd").unwrap(),
        vec![PDFObject::Int(3)]
    );
}
