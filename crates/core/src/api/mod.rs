//! High-level API module for text extraction.
//!
//! # Example
//!
//! ```ignore
//! use folio_core::api::{extract_text, ExtractOptions};
//!
//! let data = std::fs::read("document.pdf")?;
//! let items = extract_text(&data, &ExtractOptions::default())?;
//! ```

pub mod high_level;

pub use high_level::{
    ExtractOptions, TextItem, extract_text, extract_text_from_commands,
    extract_text_with_document, page_text,
};
