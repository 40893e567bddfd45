//! Paper documents: directory scanning, field extraction and the document type
//! handed to the index writer.

#[allow(clippy::module_inception)]
pub mod document;
pub mod extract;
pub mod scanner;

pub use document::PaperDocument;
pub use extract::{ExtractedFields, NO_ABSTRACT, UNKNOWN_TITLE};
pub use scanner::DirectoryScanner;
