//! State-tagged index handle.
//!
//! [`InvertedIndexWriter::commit`] already makes writing to a sealed index
//! impossible at compile time. `IndexHandle` is for callers that hold an
//! index whose state is only known at run time: every operation checks the
//! state and fails with a state error when it does not apply.

use std::sync::Arc;

use crate::document::PaperDocument;
use crate::error::{PaperSiftError, Result};
use crate::lexical::index::inverted::{
    InvertedIndexReader, InvertedIndexWriter, InvertedIndexWriterConfig,
};
use crate::lexical::search::IndexSearcher;
use crate::query::{Bm25Config, Query, SearchResults};
use crate::storage::Storage;

/// An index that is either being built or sealed for searching.
#[derive(Debug)]
pub enum IndexHandle {
    /// Accepting documents; not searchable.
    Building(InvertedIndexWriter),
    /// Committed and read-only.
    Sealed(IndexSearcher),
}

impl IndexHandle {
    /// Start a fresh index at `storage`, discarding any previous one.
    pub fn create(storage: Arc<dyn Storage>, config: InvertedIndexWriterConfig) -> Result<Self> {
        Ok(IndexHandle::Building(InvertedIndexWriter::create(
            storage, config,
        )?))
    }

    /// Open the committed index at `storage`.
    pub fn open(storage: Arc<dyn Storage>, bm25: Bm25Config) -> Result<Self> {
        let reader = InvertedIndexReader::open(storage)?;
        Ok(IndexHandle::Sealed(IndexSearcher::with_bm25(
            Arc::new(reader),
            bm25,
        )))
    }

    /// Whether the index is sealed.
    pub fn is_sealed(&self) -> bool {
        matches!(self, IndexHandle::Sealed(_))
    }

    /// Add a document to a building index.
    pub fn add_document(&mut self, doc: PaperDocument) -> Result<u64> {
        match self {
            IndexHandle::Building(writer) => writer.add_document(doc),
            IndexHandle::Sealed(_) => Err(PaperSiftError::state(
                "cannot add documents to a sealed index",
            )),
        }
    }

    /// Search a sealed index.
    pub fn search(&self, query: &dyn Query, top_k: usize) -> Result<SearchResults> {
        self.searcher()?.search(query, top_k)
    }

    /// The searcher of a sealed index.
    pub fn searcher(&self) -> Result<&IndexSearcher> {
        match self {
            IndexHandle::Sealed(searcher) => Ok(searcher),
            IndexHandle::Building(_) => Err(PaperSiftError::state("index is still building")),
        }
    }

    /// Commit a building index and seal it.
    pub fn commit(self) -> Result<Self> {
        match self {
            IndexHandle::Building(writer) => {
                let reader = writer.commit()?;
                Ok(IndexHandle::Sealed(IndexSearcher::new(Arc::new(reader))))
            }
            IndexHandle::Sealed(_) => Err(PaperSiftError::state("index is already sealed")),
        }
    }

    /// Number of documents added or committed.
    pub fn doc_count(&self) -> u64 {
        match self {
            IndexHandle::Building(writer) => writer.doc_count(),
            IndexHandle::Sealed(searcher) => searcher.doc_count(),
        }
    }
}
