//! High-level text extraction API.
//!
//! - `extract_text()` - Text of every page, with per-page warnings
//! - `extract_text_with_document()` - Same, over an already parsed document
//! - `extract_text_from_commands()` - Strings painted by a command list

use crate::document::{PDFDocument, PDFPage, ParseOptions};
use crate::error::Result;
use crate::model::objects::PDFObject;
use crate::parser::content::{Command, parse_content};
use crate::parser::token::Keyword;
use tracing::warn;

/// Options for text extraction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractOptions {
    /// Options for parsing the document itself.
    pub parse: ParseOptions,

    /// Zero-indexed page numbers to extract. None means all pages.
    pub page_numbers: Option<Vec<usize>>,

    /// Maximum number of pages to extract. 0 means no limit.
    pub maxpages: usize,
}

impl ExtractOptions {
    fn wants(&self, index: usize) -> bool {
        self.page_numbers
            .as_ref()
            .is_none_or(|numbers| numbers.contains(&index))
    }
}

/// One unit of extraction output, tagged with its zero-indexed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextItem {
    /// A string painted by a show-text operator.
    Text { page: usize, text: String },
    /// The page's content could not be decoded or parsed.
    Warning { page: usize, message: String },
}

/// Parse a document and return the text it paints, page by page.
///
/// Failing to parse the document or to locate its pages is an error. A page
/// whose content cannot be read yields a [`TextItem::Warning`] and extraction
/// moves on to the next page.
///
/// # Example
/// ```ignore
/// use folio_core::api::{extract_text, ExtractOptions, TextItem};
///
/// let data = std::fs::read("document.pdf")?;
/// for item in extract_text(&data, &ExtractOptions::default())? {
///     if let TextItem::Text { text, .. } = item {
///         println!("{text}");
///     }
/// }
/// ```
pub fn extract_text(data: &[u8], options: &ExtractOptions) -> Result<Vec<TextItem>> {
    let doc = PDFDocument::parse(data, &options.parse)?;
    extract_text_with_document(&doc, options)
}

/// Extract text from an already parsed document.
pub fn extract_text_with_document(
    doc: &PDFDocument,
    options: &ExtractOptions,
) -> Result<Vec<TextItem>> {
    let pages = doc.pages()?;
    let limit = if options.maxpages == 0 {
        usize::MAX
    } else {
        options.maxpages
    };

    let mut items = Vec::new();
    for (index, page) in pages
        .iter()
        .enumerate()
        .filter(|(index, _)| options.wants(*index))
        .take(limit)
    {
        match page_text(page) {
            Ok(texts) => items.extend(
                texts
                    .into_iter()
                    .map(|text| TextItem::Text { page: index, text }),
            ),
            Err(e) => {
                warn!(page = index, error = %e, "skipping page");
                items.push(TextItem::Warning {
                    page: index,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(items)
}

/// Text painted by one page.
pub fn page_text(page: &PDFPage) -> Result<Vec<String>> {
    let contents = page.get_contents()?;
    let commands = parse_content(&contents)?;
    Ok(extract_text_from_commands(&commands))
}

/// Strings shown by `Tj`, `'`, `"` and `TJ`, in command order.
pub fn extract_text_from_commands(commands: &[Command]) -> Vec<String> {
    commands
        .iter()
        .filter(|cmd| cmd.keyword.is_show_text())
        .filter_map(|cmd| match cmd.keyword {
            Keyword::TJ => {
                let parts = cmd.operands.iter().find_map(|op| op.as_array().ok())?;
                let bytes: Vec<u8> = parts
                    .iter()
                    .filter_map(|part| match part {
                        PDFObject::String(s) => Some(s.as_slice()),
                        _ => None,
                    })
                    .flatten()
                    .copied()
                    .collect();
                Some(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => cmd
                .string_operand()
                .map(|s| String::from_utf8_lossy(s).into_owned()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_text_operators() {
        let cmds = parse_content(
            b"BT (a) Tj [(b) -120 (c)] TJ (d) ' 1 2 (e) \" /F1 9 Tf ET",
        )
        .unwrap();
        assert_eq!(extract_text_from_commands(&cmds), vec!["a", "bc", "d", "e"]);
    }

    #[test]
    fn test_page_filter() {
        let opts = ExtractOptions {
            page_numbers: Some(vec![1]),
            ..Default::default()
        };
        assert!(!opts.wants(0));
        assert!(opts.wants(1));
        assert!(ExtractOptions::default().wants(7));
    }
}
