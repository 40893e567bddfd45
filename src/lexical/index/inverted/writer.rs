//! Inverted index writer implementation.
//!
//! The writer owns the index location for its whole life: opening it takes
//! the `write.lock`, and committing or dropping it gives the lock back.
//! Documents are analyzed field by field and buffered in memory; `commit`
//! writes one segment and publishes the commit point last.

use std::sync::Arc;

use chrono::Utc;

use crate::document::PaperDocument;
use crate::error::{PaperSiftError, Result};
use crate::lexical::index::inverted::core::{FieldStats, TermDictionary, TermInfo, TermPostingIndex};
use crate::lexical::index::inverted::doc_store::{DocStore, FieldLengths};
use crate::lexical::index::inverted::reader::InvertedIndexReader;
use crate::lexical::index::inverted::segment::{
    FORMAT_VERSION, IndexMeta, META_FILE, META_TMP_FILE, SegmentFiles, WRITE_LOCK,
};
use crate::schema::{FIELD_COUNT, Field, FieldAnalyzers};
use crate::storage::structured::StructWriter;
use crate::storage::{Storage, StorageLock};

/// How a writer treats an existing index at its location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Discard any existing index and start empty.
    Create,
}

/// Inverted index writer configuration.
#[derive(Debug, Clone)]
pub struct InvertedIndexWriterConfig {
    /// Base name of the segment files.
    pub segment_name: String,

    /// Stop words for the standard profile; `None` uses the English default.
    pub stop_words: Option<Vec<String>>,
}

impl Default for InvertedIndexWriterConfig {
    fn default() -> Self {
        InvertedIndexWriterConfig {
            segment_name: "segment_0".to_string(),
            stop_words: None,
        }
    }
}

/// Statistics about the writing process.
#[derive(Debug, Clone, Default)]
pub struct WriterStats {
    /// Number of documents added.
    pub docs_added: u64,
    /// Number of unique (field, term) pairs indexed.
    pub unique_terms: u64,
    /// Total tokens indexed across all fields.
    pub total_tokens: u64,
}

/// Builds a fresh index at a storage location.
pub struct InvertedIndexWriter {
    /// The storage backend.
    storage: Arc<dyn Storage>,

    /// Writer configuration.
    config: InvertedIndexWriterConfig,

    /// Analyzers for each field profile.
    analyzers: FieldAnalyzers,

    /// In-memory inverted index being built.
    postings: TermPostingIndex,

    /// Token count per field for each document.
    field_lengths: FieldLengths,

    /// Stored fields for each document.
    doc_store: DocStore,

    /// Document ID counter.
    next_doc_id: u64,

    /// Held until the index is committed or the writer is dropped.
    lock: Option<Box<dyn StorageLock>>,

    /// Whether the writer is closed.
    closed: bool,

    /// Writer statistics.
    stats: WriterStats,
}

impl std::fmt::Debug for InvertedIndexWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvertedIndexWriter")
            .field("config", &self.config)
            .field("next_doc_id", &self.next_doc_id)
            .field("closed", &self.closed)
            .field("locked", &self.lock.is_some())
            .field("stats", &self.stats)
            .finish()
    }
}

impl InvertedIndexWriter {
    /// Open a writer on `storage`.
    ///
    /// Fails with a state error if another writer holds the location. In
    /// [`OpenMode::Create`] any existing index is removed, commit point first.
    pub fn open(
        storage: Arc<dyn Storage>,
        mode: OpenMode,
        config: InvertedIndexWriterConfig,
    ) -> Result<Self> {
        let analyzers = match &config.stop_words {
            Some(words) => FieldAnalyzers::with_stop_words(words.iter().cloned())?,
            None => FieldAnalyzers::new()?,
        };

        let lock = storage.acquire_lock(WRITE_LOCK)?;

        match mode {
            OpenMode::Create => Self::discard_existing(storage.as_ref(), &config)?,
        }

        log::debug!("Opened index writer ({mode:?}) with {config:?}");

        Ok(InvertedIndexWriter {
            storage,
            config,
            analyzers,
            postings: TermPostingIndex::new(),
            field_lengths: FieldLengths::new(),
            doc_store: DocStore::new(),
            next_doc_id: 0,
            lock: Some(lock),
            closed: false,
            stats: WriterStats::default(),
        })
    }

    /// Open a writer in [`OpenMode::Create`].
    pub fn create(storage: Arc<dyn Storage>, config: InvertedIndexWriterConfig) -> Result<Self> {
        Self::open(storage, OpenMode::Create, config)
    }

    fn discard_existing(storage: &dyn Storage, config: &InvertedIndexWriterConfig) -> Result<()> {
        // Unpublish first so a half-deleted index is never visible.
        if storage.file_exists(META_FILE) {
            log::info!("Discarding existing index");
        }
        storage.delete_file(META_FILE)?;
        storage.delete_file(META_TMP_FILE)?;

        let segment_prefix = format!("{}.", config.segment_name);
        for name in storage.list_files()? {
            if name.starts_with("segment_") || name.starts_with(&segment_prefix) {
                storage.delete_file(&name)?;
            }
        }
        Ok(())
    }

    /// Analyze and buffer a document, returning its id.
    pub fn add_document(&mut self, doc: PaperDocument) -> Result<u64> {
        self.check_closed()?;

        let doc_id = self.next_doc_id;
        let mut lengths = [0u32; FIELD_COUNT];

        // Analyze every field before touching the postings so a failing
        // document leaves no partial entries behind.
        let mut analyzed = Vec::with_capacity(FIELD_COUNT);
        for field in Field::ALL {
            let terms: Vec<(String, u32)> = self
                .analyzers
                .for_field(field)
                .analyze(doc.get(field))?
                .map(|token| (token.text, token.position as u32))
                .collect();
            lengths[field.id() as usize] = terms.len() as u32;
            analyzed.push((field, terms));
        }

        for (field, terms) in analyzed {
            self.stats.total_tokens += terms.len() as u64;
            self.postings.put(doc_id, field, terms)?;
        }
        self.field_lengths.push(lengths);
        log::debug!("Indexed document {doc_id}: {}", doc.filename);
        self.doc_store.push(doc);

        self.next_doc_id += 1;
        self.stats.docs_added += 1;
        self.stats.unique_terms = self.postings.term_count();

        Ok(doc_id)
    }

    /// Number of documents added so far.
    pub fn doc_count(&self) -> u64 {
        self.next_doc_id
    }

    /// The analyzers used for each field.
    pub fn analyzers(&self) -> &FieldAnalyzers {
        &self.analyzers
    }

    /// Writer statistics.
    pub fn stats(&self) -> &WriterStats {
        &self.stats
    }

    /// Whether the writer has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Commit the index and open it for reading.
    ///
    /// Consumes the writer; the lock is released once the commit point is
    /// published.
    pub fn commit(mut self) -> Result<InvertedIndexReader> {
        self.check_closed()?;
        self.write_commit()?;
        InvertedIndexReader::open(self.storage.clone())
    }

    /// Commit the index and mark the writer closed.
    ///
    /// Further `add_document` calls fail. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.write_commit()
    }

    fn write_commit(&mut self) -> Result<()> {
        self.postings.seal();
        self.closed = true;

        let files = SegmentFiles::new(&self.config.segment_name);
        let fields = self.write_postings(&files)?;

        let mut writer = StructWriter::new(self.storage.create_output(&files.lengths)?);
        self.field_lengths.write(&mut writer)?;
        writer.close()?;

        let mut writer = StructWriter::new(self.storage.create_output(&files.documents)?);
        self.doc_store.write(&mut writer)?;
        writer.close()?;

        let meta = IndexMeta {
            format_version: FORMAT_VERSION,
            created_at: Utc::now(),
            doc_count: self.next_doc_id,
            stop_words: self.analyzers.stop_words().to_vec(),
            fields,
            files,
        };
        meta.write(self.storage.as_ref())?;

        if let Some(mut lock) = self.lock.take() {
            lock.release()?;
        }

        log::info!(
            "Committed {} documents ({} unique terms, {} tokens)",
            self.stats.docs_added,
            self.stats.unique_terms,
            self.stats.total_tokens
        );
        Ok(())
    }

    /// Write the postings and dictionary files, returning per-field statistics.
    fn write_postings(
        &self,
        files: &SegmentFiles,
    ) -> Result<std::collections::BTreeMap<Field, FieldStats>> {
        let mut dictionary = TermDictionary::new();
        let mut writer = StructWriter::new(self.storage.create_output(&files.postings)?);

        for field in Field::ALL {
            for (term, list) in self.postings.sorted_terms(field) {
                let offset = writer.position();
                list.encode(&mut writer)?;
                let info = TermInfo {
                    doc_freq: list.doc_frequency(),
                    total_freq: list.total_frequency,
                    offset,
                    length: writer.position() - offset,
                };
                dictionary.insert(field, term.to_string(), info);
            }
        }
        writer.close()?;

        let mut writer = StructWriter::new(self.storage.create_output(&files.dictionary)?);
        dictionary.write(&mut writer)?;
        writer.close()?;

        Ok(Field::ALL
            .into_iter()
            .map(|field| {
                let mut stats = FieldStats {
                    unique_terms: dictionary.term_count(field),
                    ..FieldStats::default()
                };
                for doc_id in 0..self.next_doc_id {
                    let length = self.field_lengths.get(doc_id, field);
                    if length > 0 {
                        stats.doc_count += 1;
                        stats.total_length += length as u64;
                    }
                }
                (field, stats)
            })
            .collect())
    }

    fn check_closed(&self) -> Result<()> {
        if self.closed {
            Err(PaperSiftError::state("writer is closed"))
        } else {
            Ok(())
        }
    }
}

impl Drop for InvertedIndexWriter {
    fn drop(&mut self) {
        if let Some(mut lock) = self.lock.take() {
            log::debug!(
                "Dropping uncommitted writer with {} documents",
                self.next_doc_id
            );
            if let Err(e) = lock.release() {
                log::warn!("Failed to release index lock: {e}");
            }
        }
    }
}
