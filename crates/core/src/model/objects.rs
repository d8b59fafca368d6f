//! Document value types.
//!
//! Names, literal strings and hex strings all collapse into
//! [`PDFObject::String`]; dictionary keys are the same bytes mapped one char
//! per byte.

use crate::codec;
use crate::document::catalog::DocStore;
use crate::error::{PdfError, Result};
use crate::parser::lexer::name_from_bytes;
use bytes::Bytes;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Weak};

/// Dictionary: string keys, unordered.
pub type PDFDict = HashMap<String, PDFObject>;

/// Document values.
#[derive(Debug, Clone, PartialEq)]
pub enum PDFObject {
    /// Null object
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Real (floating point) value
    Real(f64),
    /// Byte string (names, literal and hex strings)
    String(Vec<u8>),
    /// Array of objects
    Array(Vec<Self>),
    /// Dictionary (string -> object mapping)
    Dict(PDFDict),
    /// Indirect object reference
    Ref(PDFObjRef),
    /// Stream (dictionary + raw binary data)
    Stream(Box<PDFStream>),
}

impl PDFObject {
    /// Check if this is a null object
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get as boolean
    pub const fn as_bool(&self) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(self.type_error("bool")),
        }
    }

    /// Get as integer
    pub const fn as_int(&self) -> Result<i64> {
        match self {
            Self::Int(n) => Ok(*n),
            _ => Err(self.type_error("int")),
        }
    }

    /// Get as real (float)
    pub const fn as_real(&self) -> Result<f64> {
        match self {
            Self::Real(n) => Ok(*n),
            _ => Err(self.type_error("real")),
        }
    }

    /// Get numeric value (int or real coerced to f64)
    pub const fn as_num(&self) -> Result<f64> {
        match self {
            Self::Int(n) => Ok(*n as f64),
            Self::Real(n) => Ok(*n),
            _ => Err(self.type_error("number")),
        }
    }

    /// Get as byte string
    pub fn as_string(&self) -> Result<&[u8]> {
        match self {
            Self::String(s) => Ok(s),
            _ => Err(self.type_error("string")),
        }
    }

    /// Get a string as text, replacing invalid UTF-8.
    pub fn as_str(&self) -> Result<Cow<'_, str>> {
        self.as_string().map(String::from_utf8_lossy)
    }

    /// Get a string in dictionary-key form.
    pub fn as_name(&self) -> Result<String> {
        self.as_string().map(name_from_bytes)
    }

    /// Get as array
    pub const fn as_array(&self) -> Result<&Vec<Self>> {
        match self {
            Self::Array(arr) => Ok(arr),
            _ => Err(self.type_error("array")),
        }
    }

    /// Get as dictionary
    pub const fn as_dict(&self) -> Result<&PDFDict> {
        match self {
            Self::Dict(d) => Ok(d),
            _ => Err(self.type_error("dict")),
        }
    }

    /// Get as stream
    pub fn as_stream(&self) -> Result<&PDFStream> {
        match self {
            Self::Stream(s) => Ok(s),
            _ => Err(self.type_error("stream")),
        }
    }

    /// Get as object reference
    pub const fn as_ref(&self) -> Result<&PDFObjRef> {
        match self {
            Self::Ref(r) => Ok(r),
            _ => Err(self.type_error("ref")),
        }
    }

    /// Look up a key in a dictionary or a stream's attributes.
    pub fn get(&self, key: &str) -> Option<&PDFObject> {
        match self {
            Self::Dict(d) => d.get(key),
            Self::Stream(s) => s.get(key),
            _ => None,
        }
    }

    /// Follow references until a direct object is reached.
    ///
    /// Direct objects are returned as a fresh `Arc`; resolved indirect objects
    /// share the document's copy.
    pub fn resolve(&self) -> Result<Arc<PDFObject>> {
        let Self::Ref(first) = self else {
            return Ok(Arc::new(self.clone()));
        };
        let mut seen = HashSet::new();
        seen.insert(first.key());
        let mut current = first.resolve()?;
        loop {
            match current.as_ref() {
                Self::Ref(r) => {
                    if !seen.insert(r.key()) {
                        return Err(PdfError::CircularReference {
                            objid: r.objid,
                            genno: r.genno,
                        });
                    }
                    current = r.resolve()?;
                }
                _ => return Ok(current),
            }
        }
    }

    /// Get type name for error messages
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Dict(_) => "dict",
            Self::Ref(_) => "ref",
            Self::Stream(_) => "stream",
        }
    }

    const fn type_error(&self, expected: &'static str) -> PdfError {
        PdfError::TypeError {
            expected,
            got: self.type_name(),
        }
    }
}

/// Object table key: (object number, generation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjKey {
    pub objid: u64,
    pub genno: u64,
}

impl ObjKey {
    pub const fn new(objid: u64, genno: u64) -> Self {
        Self { objid, genno }
    }
}

impl fmt::Display for ObjKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.objid, self.genno)
    }
}

/// Indirect object reference.
///
/// Holds a non-owning handle to the document it was parsed from; resolving
/// it is a table lookup in that document.
#[derive(Clone)]
pub struct PDFObjRef {
    /// Object ID
    pub objid: u64,
    /// Generation number
    pub genno: u64,
    doc: Weak<DocStore>,
}

impl PDFObjRef {
    pub(crate) fn new(objid: u64, genno: u64, doc: Weak<DocStore>) -> Self {
        Self { objid, genno, doc }
    }

    /// A reference not bound to any document. Resolving it always fails.
    pub fn detached(objid: u64, genno: u64) -> Self {
        Self::new(objid, genno, Weak::new())
    }

    pub const fn key(&self) -> ObjKey {
        ObjKey::new(self.objid, self.genno)
    }

    /// Look this reference up in its document (one hop).
    pub fn resolve(&self) -> Result<Arc<PDFObject>> {
        let store = self.doc.upgrade().ok_or(PdfError::DocumentGone)?;
        store.lookup(self.key())
    }
}

impl PartialEq for PDFObjRef {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl fmt::Debug for PDFObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({} {})", self.objid, self.genno)
    }
}

/// Stream - dictionary attributes + raw binary data.
#[derive(Debug, Clone, PartialEq)]
pub struct PDFStream {
    /// Stream dictionary attributes
    pub attrs: PDFDict,
    /// Raw (possibly encoded) data
    rawdata: Bytes,
    /// Key of the indirect object holding this stream
    pub objid: Option<ObjKey>,
}

impl PDFStream {
    /// Create a new stream.
    pub fn new(attrs: PDFDict, rawdata: impl Into<Bytes>) -> Self {
        Self {
            attrs,
            rawdata: rawdata.into(),
            objid: None,
        }
    }

    /// Get raw (undecoded) data.
    pub fn rawdata(&self) -> &[u8] {
        self.rawdata.as_ref()
    }

    /// Get attribute by name.
    pub fn get(&self, name: &str) -> Option<&PDFObject> {
        self.attrs.get(name)
    }

    /// Check `/Length` and run the filter chain. Nothing is cached: each call
    /// decodes from the raw bytes again.
    pub fn decode(&self) -> Result<Vec<u8>> {
        codec::decode_stream(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_type_errors() {
        let obj = PDFObject::Int(3);
        assert_eq!(obj.as_int().unwrap(), 3);
        assert_eq!(obj.as_num().unwrap(), 3.0);
        assert!(matches!(
            obj.as_string(),
            Err(PdfError::TypeError {
                expected: "string",
                got: "int"
            })
        ));
    }

    #[test]
    fn test_refs_compare_by_key() {
        assert_eq!(PDFObjRef::detached(4, 0), PDFObjRef::detached(4, 0));
        assert_ne!(PDFObjRef::detached(4, 0), PDFObjRef::detached(4, 1));
    }

    #[test]
    fn test_detached_ref_does_not_resolve() {
        let obj = PDFObject::Ref(PDFObjRef::detached(1, 0));
        assert!(matches!(obj.resolve(), Err(PdfError::DocumentGone)));
    }

    #[test]
    fn test_direct_object_resolves_to_itself() {
        let obj = PDFObject::String(b"x".to_vec());
        assert_eq!(*obj.resolve().unwrap(), obj);
    }

    #[test]
    fn test_get_reads_stream_attrs() {
        let mut attrs = PDFDict::new();
        attrs.insert("Length".into(), PDFObject::Int(2));
        let obj = PDFObject::Stream(Box::new(PDFStream::new(attrs, &b"ab"[..])));
        assert_eq!(obj.get("Length"), Some(&PDFObject::Int(2)));
        assert_eq!(obj.get("Filter"), None);
    }
}
