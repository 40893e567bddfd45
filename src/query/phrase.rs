//! Phrase query implementation.

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::matcher::{EmptyMatcher, Matcher, PhraseMatcher};
use crate::query::query::Query;
use crate::query::scorer::{BM25Scorer, Bm25Config};
use crate::schema::Field;

/// A query for terms at fixed positions relative to each other.
///
/// Offsets come from analyzing the phrase with the field's analyzer, so a
/// stop word removed inside the phrase leaves the same gap it leaves in
/// indexed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    /// The field to search in.
    field: Field,
    /// Analyzed terms with their offsets from the first term.
    terms: Vec<(String, u32)>,
}

impl PhraseQuery {
    /// Create a phrase of consecutive terms.
    pub fn new<S: Into<String>>(field: Field, terms: Vec<S>) -> Self {
        PhraseQuery {
            field,
            terms: terms
                .into_iter()
                .enumerate()
                .map(|(i, term)| (term.into(), i as u32))
                .collect(),
        }
    }

    /// Create a phrase from `(term, position)` pairs, positions in any base.
    pub fn with_positions<S: Into<String>>(field: Field, terms: Vec<(S, u32)>) -> Self {
        let base = terms.iter().map(|(_, p)| *p).min().unwrap_or(0);
        PhraseQuery {
            field,
            terms: terms
                .into_iter()
                .map(|(term, position)| (term.into(), position - base))
                .collect(),
        }
    }

    /// Get the field.
    pub fn field(&self) -> Field {
        self.field
    }

    /// Get the terms with their offsets.
    pub fn terms(&self) -> &[(String, u32)] {
        &self.terms
    }
}

impl Query for PhraseQuery {
    fn matcher<'a>(
        &self,
        reader: &'a InvertedIndexReader,
        bm25: &Bm25Config,
    ) -> Result<Box<dyn Matcher + 'a>> {
        if self.terms.is_empty() {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let total_docs = reader.doc_count();
        let mut idf = 0.0;
        let mut lists = Vec::with_capacity(self.terms.len());
        for (term, offset) in &self.terms {
            let Some(list) = reader.postings(self.field, term)? else {
                return Ok(Box::new(EmptyMatcher::new()));
            };
            idf += BM25Scorer::idf(list.doc_frequency(), total_docs);
            lists.push((list, *offset));
        }

        let scorer = BM25Scorer::with_idf(
            idf,
            reader.field_stats(self.field).average_length(),
            *bm25,
        );
        Ok(Box::new(PhraseMatcher::new(
            lists, self.field, scorer, reader,
        )?))
    }

    fn description(&self) -> String {
        let phrase: Vec<&str> = self.terms.iter().map(|(t, _)| t.as_str()).collect();
        format!("{}:\"{}\"", self.field, phrase.join(" "))
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn is_empty(&self, reader: &InvertedIndexReader) -> bool {
        self.terms.is_empty()
            || self
                .terms
                .iter()
                .any(|(term, _)| reader.doc_freq(self.field, term) == 0)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn fields(&self) -> Vec<Field> {
        vec![self.field]
    }
}
