//! Postings and the in-memory postings index built by the writer.
//!
//! Postings are appended in ascending document order, which the writer
//! guarantees by assigning ids monotonically. A list therefore never needs
//! sorting or merging before it is written.

use ahash::AHashMap;

use crate::error::{PaperSiftError, Result};
use crate::schema::Field;
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// One document's occurrences of a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// Document ID.
    pub doc_id: u64,
    /// Term frequency in the document.
    pub frequency: u32,
    /// Ascending token positions of the term in the field.
    pub positions: Vec<u32>,
}

impl Posting {
    /// Create a posting with a single occurrence.
    pub fn new(doc_id: u64, position: u32) -> Self {
        Posting {
            doc_id,
            frequency: 1,
            positions: vec![position],
        }
    }

    /// Create a posting from its positions.
    pub fn with_positions(doc_id: u64, positions: Vec<u32>) -> Self {
        Posting {
            doc_id,
            frequency: positions.len() as u32,
            positions,
        }
    }

    /// Record another occurrence.
    pub fn add_position(&mut self, position: u32) {
        self.positions.push(position);
        self.frequency += 1;
    }
}

/// All postings of one (field, term) pair, in ascending document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    /// The postings in this list.
    pub postings: Vec<Posting>,
    /// Total frequency across all documents.
    pub total_frequency: u64,
}

impl PostingList {
    /// Create a new empty posting list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occurrence of the term at `position` in `doc_id`.
    ///
    /// `doc_id` must not be lower than the last document added.
    pub fn add_occurrence(&mut self, doc_id: u64, position: u32) -> Result<()> {
        match self.postings.last_mut() {
            Some(last) if last.doc_id == doc_id => last.add_position(position),
            Some(last) if last.doc_id > doc_id => {
                return Err(PaperSiftError::state(format!(
                    "postings out of order: document {doc_id} after {}",
                    last.doc_id
                )));
            }
            _ => self.postings.push(Posting::new(doc_id, position)),
        }
        self.total_frequency += 1;
        Ok(())
    }

    /// Number of documents containing the term.
    pub fn doc_frequency(&self) -> u64 {
        self.postings.len() as u64
    }

    /// Get the length of the posting list.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    /// Check if the posting list is empty.
    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Get an iterator over the postings.
    pub fn iter(&self) -> std::slice::Iter<'_, Posting> {
        self.postings.iter()
    }

    /// Encode the list with delta-compressed document ids and positions.
    pub fn encode<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.postings.len() as u64)?;

        let mut prev_doc_id = 0u64;
        for posting in &self.postings {
            writer.write_varint(posting.doc_id - prev_doc_id)?;
            prev_doc_id = posting.doc_id;
            writer.write_delta_u32s(&posting.positions)?;
        }

        Ok(())
    }

    /// Decode a list written by [`PostingList::encode`].
    pub fn decode(reader: &mut StructReader<'_>) -> Result<Self> {
        let count = reader.read_varint()? as usize;
        let mut postings = Vec::with_capacity(count);
        let mut total_frequency = 0u64;

        let mut doc_id = 0u64;
        for _ in 0..count {
            doc_id += reader.read_varint()?;
            let positions = reader.read_delta_u32s()?;
            total_frequency += positions.len() as u64;
            postings.push(Posting::with_positions(doc_id, positions));
        }

        Ok(PostingList {
            postings,
            total_frequency,
        })
    }
}

/// Postings of every (field, term) pair while an index is being built.
///
/// Once sealed, further writes fail.
#[derive(Debug, Default)]
pub struct TermPostingIndex {
    fields: AHashMap<Field, AHashMap<String, PostingList>>,
    sealed: bool,
}

impl TermPostingIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one document's terms for a field.
    ///
    /// `terms` are `(term, position)` pairs as produced by the field's analyzer.
    pub fn put<I, S>(&mut self, doc_id: u64, field: Field, terms: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: AsRef<str>,
    {
        if self.sealed {
            return Err(PaperSiftError::state("postings are sealed"));
        }

        let field_terms = self.fields.entry(field).or_default();
        for (term, position) in terms {
            let term = term.as_ref();
            match field_terms.get_mut(term) {
                Some(list) => list.add_occurrence(doc_id, position)?,
                None => {
                    let mut list = PostingList::new();
                    list.add_occurrence(doc_id, position)?;
                    field_terms.insert(term.to_string(), list);
                }
            }
        }

        Ok(())
    }

    /// Seal the index against further writes.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the index has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Get the posting list of a term.
    pub fn get_posting_list(&self, field: Field, term: &str) -> Option<&PostingList> {
        self.fields.get(&field)?.get(term)
    }

    /// Number of distinct terms across all fields.
    pub fn term_count(&self) -> u64 {
        self.fields.values().map(|terms| terms.len() as u64).sum()
    }

    /// Terms of a field with their lists, sorted by term.
    pub fn sorted_terms(&self, field: Field) -> Vec<(&str, &PostingList)> {
        let mut terms: Vec<_> = self
            .fields
            .get(&field)
            .map(|terms| terms.iter().map(|(t, l)| (t.as_str(), l)).collect())
            .unwrap_or_default();
        terms.sort_unstable_by(|a, b| a.0.cmp(b.0));
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::structured::read_verified;

    #[test]
    fn test_add_occurrence() {
        let mut list = PostingList::new();
        list.add_occurrence(0, 1).unwrap();
        list.add_occurrence(0, 4).unwrap();
        list.add_occurrence(3, 0).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.doc_frequency(), 2);
        assert_eq!(list.total_frequency, 3);
        assert_eq!(list.postings[0], Posting::with_positions(0, vec![1, 4]));
        assert_eq!(list.postings[1].frequency, 1);

        assert!(list.add_occurrence(1, 0).is_err());
    }

    #[test]
    fn test_encode_decode() {
        let storage = MemoryStorage::new();
        let mut list = PostingList::new();
        for (doc_id, position) in [(2, 0), (2, 7), (9, 3), (300, 1)] {
            list.add_occurrence(doc_id, position).unwrap();
        }

        let mut writer = StructWriter::new(storage.create_output("p").unwrap());
        list.encode(&mut writer).unwrap();
        writer.close().unwrap();

        let data = read_verified(&storage, "p").unwrap();
        let decoded = PostingList::decode(&mut StructReader::new(&data)).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_put_and_seal() {
        let mut index = TermPostingIndex::new();
        index
            .put(0, Field::Title, [("graph", 0), ("neural", 1), ("graph", 2)])
            .unwrap();
        index.put(1, Field::Title, [("neural", 0)]).unwrap();
        index.put(1, Field::Abstract, [("graph", 0)]).unwrap();

        let graph = index.get_posting_list(Field::Title, "graph").unwrap();
        assert_eq!(graph.postings[0].positions, vec![0, 2]);
        assert_eq!(index.term_count(), 3);

        let terms: Vec<&str> = index
            .sorted_terms(Field::Title)
            .into_iter()
            .map(|(t, _)| t)
            .collect();
        assert_eq!(terms, vec!["graph", "neural"]);

        index.seal();
        assert!(index.is_sealed());
        let err = index.put(2, Field::Title, [("late", 0)]).unwrap_err();
        assert!(matches!(err, PaperSiftError::State(_)));
    }
}
