//! Document module - object table, trailers and pages.
//!
//! - `catalog` - parsed document, reference resolution, parse options
//! - `page` - page tree traversal and page contents

pub mod catalog;
pub mod page;

pub use catalog::{DEFAULT_MAX_PAGE_DEPTH, DanglingPolicy, PDFDocument, ParseOptions};
pub use page::{PDFPage, find_pages};
