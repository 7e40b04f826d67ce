//! Collects the CSS text of every stylesheet attached to a document and
//! publishes it to the clipboard.
//!
//! The document is anything implementing [`style::sheet::StyleSheetList`];
//! [`source::document::HtmlDocument`] builds one from an HTML file.

pub mod clipboard;
pub mod config;
pub mod dom;
pub mod error;
pub mod extract;
pub mod parser;
pub mod schedule;
pub mod source;
pub mod style;

pub use config::ExtractorConfig;
pub use extract::{collect, Publication, StyleExtractor};
