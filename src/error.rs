//! Error types for papersift.
//!
//! All fallible operations return [`Result`], whose error side is
//! [`PaperSiftError`]. Query syntax problems are reported through the
//! dedicated [`ParseError`] enum so that interactive callers can tell the
//! kinds apart and re-prompt.
//!
//! # Examples
//!
//! ```
//! use papersift::error::{PaperSiftError, Result};
//!
//! fn open_writer(closed: bool) -> Result<()> {
//!     if closed {
//!         return Err(PaperSiftError::state("writer is closed"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(open_writer(true).is_err());
//! ```

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The main error type for papersift operations.
#[derive(Error, Debug)]
pub enum PaperSiftError {
    /// I/O errors from the persistence layer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Missing or unreadable source directory, bad index path or config file.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single document could not be extracted or analyzed.
    #[error("Ingestion error: {}: {message}", path.display())]
    Ingestion { path: PathBuf, message: String },

    /// Malformed query syntax or an unknown field name.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// An operation that the index lifecycle does not allow right now.
    #[error("State error: {0}")]
    State(String),

    /// Storage-related errors, including checksum mismatches.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the query parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The query string was empty or blank.
    #[error("query is empty")]
    EmptyQuery,

    /// A comma produced an empty clause, e.g. `title:a,`.
    #[error("empty clause at position {index} in '{query}'")]
    EmptyClause { index: usize, query: String },

    /// More clauses than the grammar allows.
    #[error("too many clauses in '{query}': found {found}, at most {max} are supported")]
    TooManyClauses {
        query: String,
        found: usize,
        max: usize,
    },

    /// A clause without the `field:` prefix.
    #[error("missing ':' in clause '{clause}' (expected field:expression)")]
    MissingColon { clause: String },

    /// A clause whose field name is blank.
    #[error("missing field name in clause '{clause}'")]
    EmptyField { clause: String },

    /// A field name other than the queryable ones.
    #[error("unknown field '{field}' (expected one of: {expected})")]
    UnknownField { field: String, expected: String },

    /// A clause with nothing after the colon.
    #[error("empty expression for field '{field}'")]
    EmptyExpression { field: String },

    /// A phrase opened with `"` but never closed.
    #[error("unterminated phrase in expression '{expression}'")]
    UnterminatedPhrase { expression: String },
}

/// Result type alias for operations that may fail with PaperSiftError.
pub type Result<T> = std::result::Result<T, PaperSiftError>;

impl PaperSiftError {
    /// Create a new configuration error.
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        PaperSiftError::Configuration(msg.into())
    }

    /// Create a new ingestion error for the given source file.
    pub fn ingestion<P: AsRef<Path>, S: Into<String>>(path: P, msg: S) -> Self {
        PaperSiftError::Ingestion {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a new state error.
    pub fn state<S: Into<String>>(msg: S) -> Self {
        PaperSiftError::State(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        PaperSiftError::Storage(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PaperSiftError::Analysis(msg.into())
    }

    /// Whether this error is confined to one document or one query,
    /// so the surrounding batch or session may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PaperSiftError::Ingestion { .. } | PaperSiftError::Parse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = PaperSiftError::state("writer is closed");
        assert_eq!(error.to_string(), "State error: writer is closed");

        let error = PaperSiftError::configuration("source directory not found");
        assert_eq!(
            error.to_string(),
            "Configuration error: source directory not found"
        );

        let error = PaperSiftError::ingestion("papers/a.txt", "invalid UTF-8");
        assert_eq!(
            error.to_string(),
            "Ingestion error: papers/a.txt: invalid UTF-8"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = PaperSiftError::from(io_error);

        match error {
            PaperSiftError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }

    #[test]
    fn test_parse_error_conversion() {
        let error: PaperSiftError = ParseError::MissingColon {
            clause: "neural".to_string(),
        }
        .into();

        assert!(error.is_recoverable());
        assert_eq!(
            error.to_string(),
            "Parse error: missing ':' in clause 'neural' (expected field:expression)"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(PaperSiftError::ingestion("x.txt", "bad").is_recoverable());
        assert!(!PaperSiftError::state("closed").is_recoverable());
        assert!(!PaperSiftError::storage("checksum").is_recoverable());
    }
}
