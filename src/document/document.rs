//! The paper document indexed and returned by searches.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::extract::ExtractedFields;
use crate::error::{PaperSiftError, Result};
use crate::schema::Field;

/// A paper with its four fields.
///
/// `path` is the path as scanned and `filename` its final component. Both are
/// indexed as single exact terms; `title` and `abstract_text` are analyzed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperDocument {
    pub path: String,
    pub filename: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
}

impl PaperDocument {
    /// Create a document from already-extracted values.
    pub fn new<P, F, T, A>(path: P, filename: F, title: T, abstract_text: A) -> Self
    where
        P: Into<String>,
        F: Into<String>,
        T: Into<String>,
        A: Into<String>,
    {
        PaperDocument {
            path: path.into(),
            filename: filename.into(),
            title: title.into(),
            abstract_text: abstract_text.into(),
        }
    }

    /// Read a paper file and extract its title and abstract.
    ///
    /// The file must be valid UTF-8; anything else is an ingestion error for
    /// this document only.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)
            .map_err(|e| PaperSiftError::ingestion(path, format!("cannot read file: {e}")))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| PaperSiftError::ingestion(path, format!("invalid UTF-8: {e}")))?;

        Ok(Self::from_text(path, &text))
    }

    /// Build a document from file contents already in memory.
    pub fn from_text<P: AsRef<Path>>(path: P, text: &str) -> Self {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ExtractedFields {
            title,
            abstract_text,
        } = ExtractedFields::from_text(text);

        PaperDocument {
            path: path.to_string_lossy().into_owned(),
            filename,
            title,
            abstract_text,
        }
    }

    /// The stored value of a field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Path => &self.path,
            Field::Filename => &self.filename,
            Field::Title => &self.title,
            Field::Abstract => &self.abstract_text,
        }
    }

    /// Rebuild a document from values in [`Field::ALL`] order.
    pub(crate) fn from_values(mut values: Vec<String>) -> Result<Self> {
        if values.len() != Field::ALL.len() {
            return Err(PaperSiftError::storage(format!(
                "stored document has {} fields, expected {}",
                values.len(),
                Field::ALL.len()
            )));
        }
        let abstract_text = values.pop().unwrap_or_default();
        let title = values.pop().unwrap_or_default();
        let filename = values.pop().unwrap_or_default();
        let path = values.pop().unwrap_or_default();

        Ok(PaperDocument {
            path,
            filename,
            title,
            abstract_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::document::extract::{NO_ABSTRACT, UNKNOWN_TITLE};

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("paper.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "Title: Sparse Attention").unwrap();
        writeln!(file, "Abstract: We study sparse attention.").unwrap();
        writeln!(file, "1. Introduction").unwrap();
        drop(file);

        let doc = PaperDocument::from_file(&path).unwrap();
        assert_eq!(doc.filename, "paper.txt");
        assert_eq!(doc.path, path.to_string_lossy());
        assert_eq!(doc.title, "Sparse Attention");
        assert_eq!(doc.abstract_text, "We study sparse attention.");
        assert_eq!(doc.get(Field::Title), "Sparse Attention");
    }

    #[test]
    fn test_from_file_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.txt");
        fs::write(&path, [0x54, 0x69, 0xff, 0xfe]).unwrap();

        let err = PaperDocument::from_file(&path).unwrap_err();
        assert!(matches!(err, PaperSiftError::Ingestion { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_from_text_defaults() {
        let doc = PaperDocument::from_text("papers/empty.txt", "");
        assert_eq!(doc.filename, "empty.txt");
        assert_eq!(doc.title, UNKNOWN_TITLE);
        assert_eq!(doc.abstract_text, NO_ABSTRACT);
    }

    #[test]
    fn test_from_values() {
        let doc = PaperDocument::new("p/a.txt", "a.txt", "T", "A");
        let values = Field::ALL.iter().map(|f| doc.get(*f).to_string()).collect();
        assert_eq!(PaperDocument::from_values(values).unwrap(), doc);

        assert!(PaperDocument::from_values(vec!["x".to_string()]).is_err());
    }
}
