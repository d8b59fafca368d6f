//! Document data model.
//!
//! - `objects` - value types (PDFObject, PDFStream, PDFObjRef)

pub mod objects;

// Re-export main types for convenience
pub use objects::{ObjKey, PDFDict, PDFObjRef, PDFObject, PDFStream};
