//! Stored fields and per-document field lengths.

use crate::document::PaperDocument;
use crate::error::{PaperSiftError, Result};
use crate::schema::{FIELD_COUNT, Field};
use crate::storage::StorageOutput;
use crate::storage::structured::{StructReader, StructWriter};

/// Verbatim stored fields of every document, indexed by document id.
#[derive(Debug, Clone, Default)]
pub struct DocStore {
    documents: Vec<PaperDocument>,
}

impl DocStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next document. Its id is the current length.
    pub fn push(&mut self, document: PaperDocument) -> u64 {
        self.documents.push(document);
        (self.documents.len() - 1) as u64
    }

    /// Stored fields of a document.
    pub fn stored_fields(&self, doc_id: u64) -> Result<&PaperDocument> {
        usize::try_from(doc_id)
            .ok()
            .and_then(|idx| self.documents.get(idx))
            .ok_or_else(|| {
                PaperSiftError::storage(format!(
                    "document {doc_id} not found ({} documents stored)",
                    self.documents.len()
                ))
            })
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Write all documents, fields in [`Field::ALL`] order.
    pub fn write<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.documents.len() as u64)?;
        for document in &self.documents {
            for field in Field::ALL {
                writer.write_string(document.get(field))?;
            }
        }
        Ok(())
    }

    /// Read documents written by [`DocStore::write`].
    pub fn read(reader: &mut StructReader<'_>) -> Result<Self> {
        let count = reader.read_varint()? as usize;
        let mut documents = Vec::with_capacity(count);
        for _ in 0..count {
            let values = Field::ALL
                .iter()
                .map(|_| reader.read_string())
                .collect::<Result<Vec<_>>>()?;
            documents.push(PaperDocument::from_values(values)?);
        }
        Ok(DocStore { documents })
    }
}

/// Token counts of every field for every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldLengths {
    lengths: Vec<[u32; FIELD_COUNT]>,
}

impl FieldLengths {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the lengths of the next document.
    pub fn push(&mut self, lengths: [u32; FIELD_COUNT]) {
        self.lengths.push(lengths);
    }

    /// Token count of `field` in `doc_id`, zero for unknown documents.
    pub fn get(&self, doc_id: u64, field: Field) -> u32 {
        usize::try_from(doc_id)
            .ok()
            .and_then(|idx| self.lengths.get(idx))
            .map_or(0, |lengths| lengths[field.id() as usize])
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    /// Write the table.
    pub fn write<W: StorageOutput>(&self, writer: &mut StructWriter<W>) -> Result<()> {
        writer.write_varint(self.lengths.len() as u64)?;
        for lengths in &self.lengths {
            for length in lengths {
                writer.write_varint(*length as u64)?;
            }
        }
        Ok(())
    }

    /// Read a table written by [`FieldLengths::write`].
    pub fn read(reader: &mut StructReader<'_>) -> Result<Self> {
        let count = reader.read_varint()? as usize;
        let mut table = Vec::with_capacity(count);
        for _ in 0..count {
            let mut lengths = [0u32; FIELD_COUNT];
            for length in lengths.iter_mut() {
                *length = reader.read_varint_u32()?;
            }
            table.push(lengths);
        }
        Ok(FieldLengths { lengths: table })
    }
}
