//! # papersift
//!
//! Keyword search over a directory of academic papers stored as plain text.
//!
//! ## Features
//!
//! - Title and abstract extraction from `.txt` papers
//! - Per-field analysis with stop words and position gaps
//! - Persistent inverted index with checksummed segment files
//! - Term and phrase queries combined with AND semantics
//! - BM25 ranking with a deterministic tie-break
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use papersift::document::PaperDocument;
//! use papersift::lexical::index::inverted::{InvertedIndexWriter, InvertedIndexWriterConfig};
//! use papersift::lexical::search::IndexSearcher;
//! use papersift::storage::MemoryStorage;
//!
//! let storage = Arc::new(MemoryStorage::new());
//! let mut writer = InvertedIndexWriter::create(storage, InvertedIndexWriterConfig::default())?;
//! writer.add_document(PaperDocument::new(
//!     "papers/gnn.txt",
//!     "gnn.txt",
//!     "Graph Neural Networks",
//!     "Message passing on graphs.",
//! ))?;
//!
//! let searcher = IndexSearcher::new(Arc::new(writer.commit()?));
//! let parsed = searcher.query_parser().parse("title:graph,abstract:\"message passing\"")?;
//! let results = searcher.search(parsed.query.as_ref(), 10)?;
//! assert_eq!(results.total_hits, 1);
//! # Ok::<(), papersift::error::PaperSiftError>(())
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod lexical;
pub mod query;
pub mod schema;
pub mod storage;
pub mod util;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
