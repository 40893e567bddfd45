//! Term query implementation.

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::matcher::{EmptyMatcher, Matcher, TermMatcher};
use crate::query::query::Query;
use crate::query::scorer::{BM25Scorer, Bm25Config};
use crate::schema::Field;

/// A query that matches documents containing a specific term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermQuery {
    /// The field to search in.
    field: Field,
    /// The analyzed term to search for.
    term: String,
}

impl TermQuery {
    /// Create a new term query. `term` must already be analyzed.
    pub fn new<T: Into<String>>(field: Field, term: T) -> Self {
        TermQuery {
            field,
            term: term.into(),
        }
    }

    /// Get the field name.
    pub fn field(&self) -> Field {
        self.field
    }

    /// Get the term.
    pub fn term(&self) -> &str {
        &self.term
    }
}

impl Query for TermQuery {
    fn matcher<'a>(
        &self,
        reader: &'a InvertedIndexReader,
        bm25: &Bm25Config,
    ) -> Result<Box<dyn Matcher + 'a>> {
        let Some(list) = reader.postings(self.field, &self.term)? else {
            return Ok(Box::new(EmptyMatcher::new()));
        };

        let scorer = BM25Scorer::new(
            list.doc_frequency(),
            reader.doc_count(),
            reader.field_stats(self.field).average_length(),
            *bm25,
        );
        Ok(Box::new(TermMatcher::new(list, self.field, scorer, reader)))
    }

    fn description(&self) -> String {
        format!("{}:{}", self.field, self.term)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn is_empty(&self, reader: &InvertedIndexReader) -> bool {
        reader.doc_freq(self.field, &self.term) == 0
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn fields(&self) -> Vec<Field> {
        vec![self.field]
    }
}
