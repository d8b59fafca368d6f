//! Page tree traversal and page content access.

use crate::error::{PdfError, Result};
use crate::model::objects::{ObjKey, PDFDict, PDFObject};
use std::collections::HashSet;
use std::sync::Arc;

/// A leaf of the page tree.
#[derive(Debug, Clone)]
pub struct PDFPage {
    /// Key of the page object, when it was reached through a reference
    pub pageid: Option<ObjKey>,
    /// Page attributes dictionary
    pub attrs: PDFDict,
}

impl PDFPage {
    /// Decoded content bytes of this page.
    ///
    /// `Contents` may be one stream or an array of streams; array parts are
    /// joined with a newline so tokens never run together across a boundary.
    /// A page without `Contents` has empty content.
    pub fn get_contents(&self) -> Result<Vec<u8>> {
        let Some(contents) = self.attrs.get("Contents") else {
            return Ok(Vec::new());
        };
        let resolved = contents.resolve()?;
        match resolved.as_ref() {
            PDFObject::Stream(stream) => stream.decode(),
            PDFObject::Array(parts) => {
                let mut data = Vec::new();
                for (i, part) in parts.iter().enumerate() {
                    let part = part.resolve()?;
                    if i > 0 {
                        data.push(b'\n');
                    }
                    data.extend_from_slice(&part.as_stream()?.decode()?);
                }
                Ok(data)
            }
            other => Err(PdfError::TypeError {
                expected: "stream or array",
                got: other.type_name(),
            }),
        }
    }
}

/// Collect the pages under a page-tree node, in document order.
///
/// `node` may be a reference or a dictionary. A node whose `Type` is `Page`
/// is a leaf; any other node must have `Kids`.
pub fn find_pages(node: &PDFObject, max_depth: usize) -> Result<Vec<PDFPage>> {
    let mut walker = TreeWalker {
        max_depth,
        visited: HashSet::new(),
        pages: Vec::new(),
    };
    walker.visit(node, 0)?;
    Ok(walker.pages)
}

struct TreeWalker {
    max_depth: usize,
    visited: HashSet<ObjKey>,
    pages: Vec<PDFPage>,
}

impl TreeWalker {
    fn visit(&mut self, node: &PDFObject, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(PdfError::PageTree(format!(
                "page tree deeper than {} levels",
                self.max_depth
            )));
        }

        let key = match node {
            PDFObject::Ref(r) => {
                if !self.visited.insert(r.key()) {
                    return Err(PdfError::PageTree(format!("cycle through {}", r.key())));
                }
                Some(r.key())
            }
            _ => None,
        };
        let resolved: Arc<PDFObject> = node.resolve()?;
        let dict = resolved.as_dict()?;

        if is_typed(dict, "Page") {
            self.pages.push(PDFPage {
                pageid: key,
                attrs: dict.clone(),
            });
            return Ok(());
        }

        let kids = dict
            .get("Kids")
            .ok_or_else(|| PdfError::KeyError("Kids".into()))?
            .resolve()?;
        for kid in kids.as_array()? {
            self.visit(kid, depth + 1)?;
        }
        Ok(())
    }
}

/// Whether a dictionary's `Type` entry resolves to the given name.
pub(crate) fn is_typed(dict: &PDFDict, type_name: &str) -> bool {
    dict.get("Type")
        .and_then(|t| t.resolve().ok())
        .is_some_and(|t| matches!(t.as_ref(), PDFObject::String(s) if s == type_name.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::objects::PDFStream;

    fn name(s: &str) -> PDFObject {
        PDFObject::String(s.as_bytes().to_vec())
    }

    fn page_dict() -> PDFDict {
        let mut d = PDFDict::new();
        d.insert("Type".into(), name("Page"));
        d
    }

    #[test]
    fn test_direct_leaf() {
        let pages = find_pages(&PDFObject::Dict(page_dict()), 4).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].pageid, None);
    }

    #[test]
    fn test_inline_kids_in_order() {
        let mut first = page_dict();
        first.insert("N".into(), PDFObject::Int(1));
        let mut second = page_dict();
        second.insert("N".into(), PDFObject::Int(2));
        let mut root = PDFDict::new();
        root.insert(
            "Kids".into(),
            PDFObject::Array(vec![PDFObject::Dict(first), PDFObject::Dict(second)]),
        );
        let pages = find_pages(&PDFObject::Dict(root), 4).unwrap();
        let ns: Vec<i64> = pages
            .iter()
            .map(|p| p.attrs["N"].as_int().unwrap())
            .collect();
        assert_eq!(ns, vec![1, 2]);
    }

    #[test]
    fn test_depth_bound() {
        let mut node = PDFObject::Dict(page_dict());
        for _ in 0..3 {
            let mut parent = PDFDict::new();
            parent.insert("Kids".into(), PDFObject::Array(vec![node]));
            node = PDFObject::Dict(parent);
        }
        assert_eq!(find_pages(&node, 3).unwrap().len(), 1);
        assert!(matches!(find_pages(&node, 2), Err(PdfError::PageTree(_))));
    }

    #[test]
    fn test_missing_kids() {
        assert!(matches!(
            find_pages(&PDFObject::Dict(PDFDict::new()), 4),
            Err(PdfError::KeyError(_))
        ));
    }

    #[test]
    fn test_contents_absent_is_empty() {
        let page = PDFPage {
            pageid: None,
            attrs: page_dict(),
        };
        assert_eq!(page.get_contents().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_contents_array_joined() {
        let stream = |data: &'static [u8]| {
            let mut attrs = PDFDict::new();
            attrs.insert("Length".into(), PDFObject::Int(data.len() as i64));
            PDFObject::Stream(Box::new(PDFStream::new(attrs, data)))
        };
        let mut attrs = page_dict();
        attrs.insert(
            "Contents".into(),
            PDFObject::Array(vec![stream(b"(a) Tj"), stream(b"(b) Tj")]),
        );
        let page = PDFPage {
            pageid: None,
            attrs,
        };
        assert_eq!(page.get_contents().unwrap(), b"(a) Tj\n(b) Tj");
    }
}
