//! Segment file names and the JSON commit point.
//!
//! An index directory is committed when `index.meta` exists. The writer
//! produces every data file first and publishes the commit point last by
//! renaming `index.meta.tmp`, so a crash mid-commit leaves no index at all
//! rather than a partial one.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PaperSiftError, Result};
use crate::lexical::index::inverted::core::FieldStats;
use crate::schema::Field;
use crate::storage::Storage;

/// Name of the commit point.
pub const META_FILE: &str = "index.meta";

/// Temporary name the commit point is written under before publishing.
pub const META_TMP_FILE: &str = "index.meta.tmp";

/// Name of the writer lock (`write.lock` on disk).
pub const WRITE_LOCK: &str = "write";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// Data files of one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentFiles {
    pub dictionary: String,
    pub postings: String,
    pub lengths: String,
    pub documents: String,
}

impl SegmentFiles {
    /// File names for a segment.
    pub fn new(segment_name: &str) -> Self {
        SegmentFiles {
            dictionary: format!("{segment_name}.dict"),
            postings: format!("{segment_name}.post"),
            lengths: format!("{segment_name}.lens"),
            documents: format!("{segment_name}.docs"),
        }
    }

    /// All file names.
    pub fn names(&self) -> [&str; 4] {
        [
            &self.dictionary,
            &self.postings,
            &self.lengths,
            &self.documents,
        ]
    }
}

/// The commit point of an index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub doc_count: u64,
    pub stop_words: Vec<String>,
    pub fields: BTreeMap<Field, FieldStats>,
    pub files: SegmentFiles,
}

impl IndexMeta {
    /// Statistics of a field, zero if the field has no entry.
    pub fn field_stats(&self, field: Field) -> FieldStats {
        self.fields.get(&field).copied().unwrap_or_default()
    }

    /// Whether `storage` holds a committed index.
    pub fn exists(storage: &dyn Storage) -> bool {
        storage.file_exists(META_FILE)
    }

    /// Load the commit point.
    pub fn read(storage: &dyn Storage) -> Result<Self> {
        if !Self::exists(storage) {
            return Err(PaperSiftError::state(
                "no committed index found at this location",
            ));
        }

        let mut input = storage.open_input(META_FILE)?;
        let mut json = String::new();
        input.read_to_string(&mut json)?;
        let meta: IndexMeta = serde_json::from_str(&json)?;

        if meta.format_version != FORMAT_VERSION {
            return Err(PaperSiftError::storage(format!(
                "unsupported index format version {} (expected {FORMAT_VERSION})",
                meta.format_version
            )));
        }

        Ok(meta)
    }

    /// Publish the commit point: write the temporary file, then rename it.
    pub fn write(&self, storage: &dyn Storage) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;

        let mut output = storage.create_output(META_TMP_FILE)?;
        output.write_all(&json)?;
        output.flush_and_sync()?;
        output.close()?;

        storage.rename_file(META_TMP_FILE, META_FILE)?;
        storage.sync()
    }
}
