//! A query that matches nothing.

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::matcher::{EmptyMatcher, Matcher};
use crate::query::query::Query;
use crate::query::scorer::Bm25Config;
use crate::schema::Field;

/// Stands in for an expression whose words all analyze away, such as
/// `abstract:the`. It keeps the field it was written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchNoneQuery {
    field: Field,
}

impl MatchNoneQuery {
    /// Create a query on `field` that matches no documents.
    pub fn new(field: Field) -> Self {
        MatchNoneQuery { field }
    }
}

impl Query for MatchNoneQuery {
    fn matcher<'a>(
        &self,
        _reader: &'a InvertedIndexReader,
        _bm25: &Bm25Config,
    ) -> Result<Box<dyn Matcher + 'a>> {
        Ok(Box::new(EmptyMatcher::new()))
    }

    fn description(&self) -> String {
        format!("{}:<none>", self.field)
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(*self)
    }

    fn is_empty(&self, _reader: &InvertedIndexReader) -> bool {
        true
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn fields(&self) -> Vec<Field> {
        vec![self.field]
    }
}
