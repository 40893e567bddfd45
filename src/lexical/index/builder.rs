//! Fail-soft batch ingestion of paper files.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::document::PaperDocument;
use crate::error::Result;
use crate::lexical::index::inverted::{InvertedIndexReader, InvertedIndexWriter};

/// A file left out of the index.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Progress notification for each file handled.
#[derive(Debug)]
pub enum IngestEvent<'a> {
    /// The file was added under `doc_id`.
    Indexed { path: &'a Path, doc_id: u64 },
    /// The file could not be read or extracted.
    Skipped { path: &'a Path, reason: &'a str },
}

/// Outcome of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub files_found: usize,
    pub indexed: usize,
    pub skipped: Vec<SkippedFile>,
    pub elapsed: Duration,
}

impl IngestStats {
    /// Mean time per indexed file.
    pub fn average_per_file(&self) -> Duration {
        if self.indexed == 0 {
            Duration::ZERO
        } else {
            self.elapsed / self.indexed as u32
        }
    }
}

/// Feeds paper files to a writer, skipping files that fail extraction.
#[derive(Debug)]
pub struct IndexBuilder {
    writer: InvertedIndexWriter,
}

impl IndexBuilder {
    /// Wrap an open writer.
    pub fn new(writer: InvertedIndexWriter) -> Self {
        IndexBuilder { writer }
    }

    /// Index `paths` in order.
    ///
    /// A file that cannot be read or decoded is logged, recorded in the
    /// returned stats and skipped. Writer failures abort the batch.
    pub fn index_files<F>(&mut self, paths: &[PathBuf], mut on_event: F) -> Result<IngestStats>
    where
        F: FnMut(IngestEvent<'_>),
    {
        let start = Instant::now();
        let mut stats = IngestStats {
            files_found: paths.len(),
            ..IngestStats::default()
        };

        for path in paths {
            let document = match PaperDocument::from_file(path) {
                Ok(document) => document,
                Err(e) if e.is_recoverable() => {
                    log::warn!("Skipping {}: {e}", path.display());
                    let reason = e.to_string();
                    on_event(IngestEvent::Skipped {
                        path,
                        reason: &reason,
                    });
                    stats.skipped.push(SkippedFile {
                        path: path.clone(),
                        reason,
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };

            let doc_id = self.writer.add_document(document)?;
            stats.indexed += 1;
            on_event(IngestEvent::Indexed { path, doc_id });
        }

        stats.elapsed = start.elapsed();
        log::info!(
            "Indexed {} of {} files in {:?} ({} skipped)",
            stats.indexed,
            stats.files_found,
            stats.elapsed,
            stats.skipped.len()
        );
        Ok(stats)
    }

    /// The underlying writer.
    pub fn writer(&self) -> &InvertedIndexWriter {
        &self.writer
    }

    /// Commit everything indexed so far.
    pub fn commit(self) -> Result<InvertedIndexReader> {
        self.writer.commit()
    }
}
