//! Term dictionary: per-field sorted terms and their postings locations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PaperSiftError, Result};
use crate::schema::Field;
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// Dictionary entry for one term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermInfo {
    /// Number of documents containing this term.
    pub doc_freq: u64,
    /// Total number of occurrences across all documents.
    pub total_freq: u64,
    /// Byte offset of the posting list in the postings file.
    pub offset: u64,
    /// Byte length of the encoded posting list.
    pub length: u64,
}

/// Statistics about a term in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermStats {
    /// The term text
    pub term: String,
    /// Number of documents containing this term
    pub doc_freq: u64,
    /// Total number of occurrences across all documents
    pub total_term_freq: u64,
}

/// Per-field length statistics, recorded in the commit point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    /// Documents with at least one token in the field.
    pub doc_count: u64,
    /// Sum of the field's token counts over all documents.
    pub total_length: u64,
    /// Number of distinct terms in the field.
    pub unique_terms: u64,
}

impl FieldStats {
    /// Average field length over the documents that have the field.
    pub fn average_length(&self) -> f32 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_length as f32 / self.doc_count as f32
        }
    }
}

/// Sorted term dictionary for all fields.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    fields: BTreeMap<Field, BTreeMap<String, TermInfo>>,
}

impl TermDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term.
    pub fn insert(&mut self, field: Field, term: String, info: TermInfo) {
        self.fields.entry(field).or_default().insert(term, info);
    }

    /// Look up a term.
    pub fn get(&self, field: Field, term: &str) -> Option<&TermInfo> {
        self.fields.get(&field)?.get(term)
    }

    /// Number of distinct terms in a field.
    pub fn term_count(&self, field: Field) -> u64 {
        self.fields.get(&field).map_or(0, |terms| terms.len() as u64)
    }

    /// Terms of a field in sorted order.
    pub fn terms(&self, field: Field) -> impl Iterator<Item = TermStats> + '_ {
        self.fields
            .get(&field)
            .into_iter()
            .flat_map(|terms| terms.iter())
            .map(|(term, info)| TermStats {
                term: term.clone(),
                doc_freq: info.doc_freq,
                total_term_freq: info.total_freq,
            })
    }

    /// Write the dictionary.
    pub fn write<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.fields.len() as u64)?;
        for (field, terms) in &self.fields {
            writer.write_u8(field.id())?;
            writer.write_varint(terms.len() as u64)?;
            for (term, info) in terms {
                writer.write_string(term)?;
                writer.write_varint(info.doc_freq)?;
                writer.write_varint(info.total_freq)?;
                writer.write_varint(info.offset)?;
                writer.write_varint(info.length)?;
            }
        }
        Ok(())
    }

    /// Read a dictionary written by [`TermDictionary::write`].
    pub fn read(reader: &mut StructReader<'_>) -> Result<Self> {
        let mut dictionary = TermDictionary::new();

        let field_count = reader.read_varint()?;
        for _ in 0..field_count {
            let id = reader.read_u8()?;
            let field = Field::from_id(id)
                .ok_or_else(|| PaperSiftError::storage(format!("unknown field id {id}")))?;

            let term_count = reader.read_varint()?;
            for _ in 0..term_count {
                let term = reader.read_string()?;
                let info = TermInfo {
                    doc_freq: reader.read_varint()?,
                    total_freq: reader.read_varint()?,
                    offset: reader.read_varint()?,
                    length: reader.read_varint()?,
                };
                dictionary.insert(field, term, info);
            }
        }

        Ok(dictionary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::structured::read_verified;

    fn info(doc_freq: u64, offset: u64) -> TermInfo {
        TermInfo {
            doc_freq,
            total_freq: doc_freq * 2,
            offset,
            length: 5,
        }
    }

    #[test]
    fn test_write_read() {
        let mut dictionary = TermDictionary::new();
        dictionary.insert(Field::Title, "neural".to_string(), info(2, 0));
        dictionary.insert(Field::Title, "graph".to_string(), info(1, 5));
        dictionary.insert(Field::Filename, "a.txt".to_string(), info(1, 10));

        let storage = MemoryStorage::new();
        let mut writer = StructWriter::new(storage.create_output("d").unwrap());
        dictionary.write(&mut writer).unwrap();
        writer.close().unwrap();

        let data = read_verified(&storage, "d").unwrap();
        let read = TermDictionary::read(&mut StructReader::new(&data)).unwrap();

        assert_eq!(read.get(Field::Title, "graph"), Some(&info(1, 5)));
        assert_eq!(read.get(Field::Abstract, "graph"), None);
        assert_eq!(read.term_count(Field::Title), 2);

        let terms: Vec<String> = read.terms(Field::Title).map(|t| t.term).collect();
        assert_eq!(terms, vec!["graph", "neural"]);
    }

    #[test]
    fn test_average_length() {
        let stats = FieldStats {
            doc_count: 4,
            total_length: 10,
            unique_terms: 3,
        };
        assert_eq!(stats.average_length(), 2.5);
        assert_eq!(FieldStats::default().average_length(), 0.0);
    }
}
