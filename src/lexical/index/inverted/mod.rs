//! Single-segment inverted index: postings, dictionary, stored fields and
//! the writer/reader pair that moves an index from building to sealed.

pub mod core;
pub mod doc_store;
pub mod reader;
pub mod segment;
pub mod writer;

pub use reader::InvertedIndexReader;
pub use segment::IndexMeta;
pub use writer::{InvertedIndexWriter, InvertedIndexWriterConfig, OpenMode, WriterStats};
