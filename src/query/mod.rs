//! Query system for searching documents.

pub mod boolean;
pub mod collector;
pub mod match_none;
pub mod matcher;
pub mod parser;
pub mod phrase;
#[allow(clippy::module_inception)]
pub mod query;
pub mod scorer;
pub mod term;

pub use self::boolean::{BooleanClause, BooleanQuery, Occur};
pub use self::collector::{Collector, TopDocsCollector};
pub use self::match_none::MatchNoneQuery;
pub use self::matcher::Matcher;
pub use self::parser::{ParsedQuery, QueryParser};
pub use self::phrase::PhraseQuery;
pub use self::query::Query;
pub use self::scorer::{BM25Scorer, Bm25Config};
pub use self::term::TermQuery;

use serde::{Deserialize, Serialize};

use crate::document::PaperDocument;

/// A search hit containing a document and its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The document ID.
    pub doc_id: u64,
    /// The relevance score.
    pub score: f32,
    /// The stored fields (if retrieved).
    pub document: Option<PaperDocument>,
}

/// Search results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    /// The search hits, best first.
    pub hits: Vec<SearchHit>,
    /// Total number of matching documents.
    pub total_hits: u64,
    /// Maximum score in the results.
    pub max_score: f32,
}

impl SearchResults {
    /// Whether nothing matched.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}
