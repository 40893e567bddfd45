//! Base query trait.

use std::any::Any;
use std::fmt::Debug;

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::matcher::Matcher;
use crate::query::scorer::Bm25Config;
use crate::schema::Field;

/// Trait for search queries.
pub trait Query: Send + Sync + Debug {
    /// Create a scoring matcher for this query over `reader`.
    fn matcher<'a>(
        &self,
        reader: &'a InvertedIndexReader,
        bm25: &Bm25Config,
    ) -> Result<Box<dyn Matcher + 'a>>;

    /// Get a human-readable description of this query.
    fn description(&self) -> String;

    /// Clone this query.
    fn clone_box(&self) -> Box<dyn Query>;

    /// Check if this query can match no document in `reader`.
    fn is_empty(&self, reader: &InvertedIndexReader) -> bool;

    /// Get this query as Any for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Fields this query searches.
    fn fields(&self) -> Vec<Field>;
}

impl Clone for Box<dyn Query> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
