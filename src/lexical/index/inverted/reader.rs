//! Reader over a committed index.
//!
//! Opening a reader loads the commit point, verifies the checksum of every
//! segment file and keeps the decoded dictionary, lengths and stored fields in
//! memory. Postings stay encoded and are decoded per term on demand. A reader
//! never changes after it is opened, so it can be shared across threads.

use std::sync::Arc;

use crate::document::PaperDocument;
use crate::error::{PaperSiftError, Result};
use crate::lexical::index::inverted::core::{
    FieldStats, PostingList, TermDictionary, TermInfo, TermStats,
};
use crate::lexical::index::inverted::doc_store::{DocStore, FieldLengths};
use crate::lexical::index::inverted::segment::IndexMeta;
use crate::schema::{Field, FieldAnalyzers};
use crate::storage::Storage;
use crate::storage::structured::{StructReader, read_verified};

/// An immutable, sealed view of a committed index.
pub struct InvertedIndexReader {
    meta: IndexMeta,
    analyzers: FieldAnalyzers,
    dictionary: TermDictionary,
    postings: Vec<u8>,
    field_lengths: FieldLengths,
    doc_store: DocStore,
}

impl std::fmt::Debug for InvertedIndexReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvertedIndexReader")
            .field("doc_count", &self.meta.doc_count)
            .field("created_at", &self.meta.created_at)
            .field("postings_bytes", &self.postings.len())
            .finish()
    }
}

impl InvertedIndexReader {
    /// Open the committed index in `storage`.
    ///
    /// Fails with a state error when there is no commit point, and with a
    /// storage error when any file is corrupt.
    pub fn open(storage: Arc<dyn Storage>) -> Result<Self> {
        let storage = storage.as_ref();
        let meta = IndexMeta::read(storage)?;
        let analyzers = FieldAnalyzers::with_stop_words(meta.stop_words.iter().cloned())?;

        let data = read_verified(storage, &meta.files.dictionary)?;
        let dictionary = TermDictionary::read(&mut StructReader::new(&data))?;

        let postings = read_verified(storage, &meta.files.postings)?;

        let data = read_verified(storage, &meta.files.lengths)?;
        let field_lengths = FieldLengths::read(&mut StructReader::new(&data))?;

        let data = read_verified(storage, &meta.files.documents)?;
        let doc_store = DocStore::read(&mut StructReader::new(&data))?;

        if doc_store.len() as u64 != meta.doc_count || field_lengths.len() != doc_store.len() {
            return Err(PaperSiftError::storage(format!(
                "index is inconsistent: commit point lists {} documents, store has {}, lengths have {}",
                meta.doc_count,
                doc_store.len(),
                field_lengths.len()
            )));
        }

        log::debug!(
            "Opened index with {} documents committed at {}",
            meta.doc_count,
            meta.created_at
        );

        Ok(InvertedIndexReader {
            meta,
            analyzers,
            dictionary,
            postings,
            field_lengths,
            doc_store,
        })
    }

    /// Number of documents in the index.
    pub fn doc_count(&self) -> u64 {
        self.meta.doc_count
    }

    /// The commit point this reader was opened from.
    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    /// Analyzers matching the ones the index was built with.
    pub fn analyzers(&self) -> &FieldAnalyzers {
        &self.analyzers
    }

    /// Length statistics of a field.
    pub fn field_stats(&self, field: Field) -> FieldStats {
        self.meta.field_stats(field)
    }

    /// Dictionary entry of a term.
    pub fn term_info(&self, field: Field, term: &str) -> Option<&TermInfo> {
        self.dictionary.get(field, term)
    }

    /// Number of documents containing `term` in `field`.
    pub fn doc_freq(&self, field: Field, term: &str) -> u64 {
        self.term_info(field, term).map_or(0, |info| info.doc_freq)
    }

    /// Decode the postings of a term, `None` if it does not occur.
    pub fn postings(&self, field: Field, term: &str) -> Result<Option<PostingList>> {
        let Some(info) = self.term_info(field, term) else {
            return Ok(None);
        };
        let mut reader = StructReader::new(&self.postings);
        reader.seek(info.offset as usize)?;
        PostingList::decode(&mut reader).map(Some)
    }

    /// Token count of `field` in a document.
    pub fn field_length(&self, doc_id: u64, field: Field) -> u32 {
        self.field_lengths.get(doc_id, field)
    }

    /// Stored fields of a document.
    pub fn stored_fields(&self, doc_id: u64) -> Result<&PaperDocument> {
        self.doc_store.stored_fields(doc_id)
    }

    /// Number of distinct terms in a field.
    pub fn unique_terms(&self, field: Field) -> u64 {
        self.dictionary.term_count(field)
    }

    /// Terms of a field in sorted order.
    pub fn terms(&self, field: Field) -> impl Iterator<Item = TermStats> + '_ {
        self.dictionary.terms(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::index::inverted::segment::SegmentFiles;
    use crate::lexical::index::inverted::writer::{InvertedIndexWriter, InvertedIndexWriterConfig};
    use crate::storage::memory::MemoryStorage;

    fn build(storage: Arc<MemoryStorage>) -> InvertedIndexReader {
        let mut writer =
            InvertedIndexWriter::create(storage, InvertedIndexWriterConfig::default()).unwrap();
        writer
            .add_document(PaperDocument::new(
                "p/a.txt",
                "a.txt",
                "Graph Neural Networks",
                "Graph networks learn on graph data.",
            ))
            .unwrap();
        writer
            .add_document(PaperDocument::new(
                "p/b.txt",
                "b.txt",
                "Transformers",
                "Attention over sequences.",
            ))
            .unwrap();
        writer.commit().unwrap()
    }

    #[test]
    fn test_postings_and_stats() {
        let reader = build(Arc::new(MemoryStorage::new()));

        let list = reader.postings(Field::Abstract, "graph").unwrap().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.postings[0].doc_id, 0);
        assert_eq!(list.postings[0].positions, vec![0, 4]);
        assert!(reader.postings(Field::Abstract, "missing").unwrap().is_none());

        assert_eq!(reader.doc_freq(Field::Filename, "b.txt"), 1);
        assert_eq!(reader.field_length(0, Field::Abstract), 5);

        let stats = reader.field_stats(Field::Title);
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.total_length, 4);
        assert_eq!(stats.unique_terms, 4);

        assert_eq!(reader.stored_fields(1).unwrap().title, "Transformers");
    }

    #[test]
    fn test_reopen() {
        let storage = Arc::new(MemoryStorage::new());
        let first = build(storage.clone());
        let second = InvertedIndexReader::open(storage).unwrap();

        assert_eq!(second.doc_count(), first.doc_count());
        assert_eq!(second.meta(), first.meta());
        assert_eq!(
            second.terms(Field::Title).collect::<Vec<_>>(),
            first.terms(Field::Title).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_corrupt_postings_are_rejected() {
        let storage = Arc::new(MemoryStorage::new());
        build(storage.clone());

        let name = SegmentFiles::new("segment_0").postings;
        let mut data = storage.get_bytes(&name).unwrap();
        data[0] ^= 0xff;
        storage.put_bytes(&name, data);

        let err = InvertedIndexReader::open(storage).unwrap_err();
        assert!(matches!(err, PaperSiftError::Storage(_)));
    }

    #[test]
    fn test_open_without_commit_point() {
        let err = InvertedIndexReader::open(Arc::new(MemoryStorage::new())).unwrap_err();
        assert!(matches!(err, PaperSiftError::State(_)));
    }
}
