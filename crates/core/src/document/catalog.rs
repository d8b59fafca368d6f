//! Document - object table, trailers and reference resolution.
//!
//! A document is built by one parse pass and frozen afterwards. References
//! inside it point back at the same store through a `Weak` handle, so they
//! never keep the document alive and resolving one is a hash lookup.

use super::page::{self, PDFPage};
use crate::error::{PdfError, Result};
use crate::model::objects::{ObjKey, PDFDict, PDFObject};
use crate::parser::document::DocumentHandler;
use crate::parser::lexer::lex;
use crate::parser::stack::StackParser;
use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};

pub const DEFAULT_MAX_PAGE_DEPTH: usize = 64;

/// What resolving a reference to an undefined object does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DanglingPolicy {
    /// Fail with [`PdfError::Reference`].
    #[default]
    Error,
    /// Resolve to [`PDFObject::Null`].
    Null,
}

/// Options for parsing a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Behavior for references to objects missing from the table.
    pub dangling: DanglingPolicy,
    /// Maximum nesting of the page tree before traversal gives up.
    pub max_page_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            dangling: DanglingPolicy::Error,
            max_page_depth: DEFAULT_MAX_PAGE_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_dangling(mut self, dangling: DanglingPolicy) -> Self {
        self.dangling = dangling;
        self
    }

    pub fn with_max_page_depth(mut self, depth: usize) -> Self {
        self.max_page_depth = depth;
        self
    }
}

/// Frozen result of a parse pass.
#[derive(Debug, Default)]
pub(crate) struct ObjectTable {
    pub(crate) objects: FxHashMap<ObjKey, Arc<PDFObject>>,
    pub(crate) trailers: Vec<PDFDict>,
}

/// Shared storage behind a document and its references.
#[derive(Debug)]
pub(crate) struct DocStore {
    table: OnceLock<ObjectTable>,
    options: ParseOptions,
}

impl DocStore {
    pub(crate) fn new(options: ParseOptions) -> Arc<Self> {
        Arc::new(Self {
            table: OnceLock::new(),
            options,
        })
    }

    /// Freeze the table. Only the first call has any effect.
    pub(crate) fn freeze(&self, table: ObjectTable) -> bool {
        self.table.set(table).is_ok()
    }

    fn table(&self) -> Option<&ObjectTable> {
        self.table.get()
    }

    pub(crate) fn lookup(&self, key: ObjKey) -> Result<Arc<PDFObject>> {
        let found = self.table().and_then(|t| t.objects.get(&key));
        match (found, self.options.dangling) {
            (Some(obj), _) => Ok(Arc::clone(obj)),
            (None, DanglingPolicy::Null) => Ok(Arc::new(PDFObject::Null)),
            (None, DanglingPolicy::Error) => Err(PdfError::Reference {
                objid: key.objid,
                genno: key.genno,
            }),
        }
    }
}

/// A parsed document. Cheap to clone; clones share the same table.
#[derive(Debug, Clone)]
pub struct PDFDocument {
    store: Arc<DocStore>,
}

impl PDFDocument {
    /// Lex and parse a whole document buffer.
    pub fn parse(data: &[u8], options: &ParseOptions) -> Result<Self> {
        let tokens = lex(data).into_result()?;
        let mut handler = DocumentHandler::new(options.clone());
        StackParser::new(&tokens).run(&mut handler)?;
        handler.into_document()
    }

    pub(crate) fn from_store(store: Arc<DocStore>) -> Self {
        Self { store }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.store.options
    }

    fn table(&self) -> &ObjectTable {
        static EMPTY: OnceLock<ObjectTable> = OnceLock::new();
        self.store
            .table()
            .unwrap_or_else(|| EMPTY.get_or_init(ObjectTable::default))
    }

    /// Get an indirect object by key, honoring the dangling policy.
    pub fn getobj(&self, objid: u64, genno: u64) -> Result<Arc<PDFObject>> {
        self.store.lookup(ObjKey::new(objid, genno))
    }

    /// Check whether the object table defines a key.
    pub fn contains(&self, objid: u64, genno: u64) -> bool {
        self.table()
            .objects
            .contains_key(&ObjKey::new(objid, genno))
    }

    /// Resolve a value that may be a reference.
    pub fn resolve(&self, obj: &PDFObject) -> Result<Arc<PDFObject>> {
        obj.resolve()
    }

    /// Number of indirect objects.
    pub fn len(&self) -> usize {
        self.table().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().objects.is_empty()
    }

    /// All object keys in ascending order.
    pub fn objects(&self) -> Vec<ObjKey> {
        let mut keys: Vec<ObjKey> = self.table().objects.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Trailer dictionaries in file order (one per incremental revision).
    pub fn trailers(&self) -> &[PDFDict] {
        &self.table().trailers
    }

    /// The document catalog.
    ///
    /// Taken from the most recent trailer that has a `Root` entry; without
    /// one, the lowest-numbered object typed `Catalog` is used.
    pub fn catalog(&self) -> Result<Arc<PDFObject>> {
        if let Some(root) = self
            .trailers()
            .iter()
            .rev()
            .find_map(|trailer| trailer.get("Root"))
        {
            return root.resolve();
        }

        for key in self.objects() {
            let obj = self.getobj(key.objid, key.genno)?;
            if obj.as_dict().is_ok_and(|d| page::is_typed(d, "Catalog")) {
                return Ok(obj);
            }
        }
        Err(PdfError::KeyError("Root".into()))
    }

    /// All pages reachable from the catalog's page tree, in order.
    pub fn pages(&self) -> Result<Vec<PDFPage>> {
        let catalog = self.catalog()?;
        let root = catalog
            .get("Pages")
            .ok_or_else(|| PdfError::KeyError("Pages".into()))?;
        page::find_pages(root, self.options().max_page_depth)
    }
}
