//! Boolean combination of sub-queries.

use std::fmt;

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::matcher::{
    ConjunctionMatcher, DisjunctionMatcher, EmptyMatcher, Matcher, ReqOptMatcher,
};
use crate::query::query::Query;
use crate::query::scorer::Bm25Config;
use crate::schema::Field;

/// How a clause takes part in a [`BooleanQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    /// The clause must match.
    Must,
    /// The clause may match and adds to the score when it does.
    Should,
}

/// A sub-query with its occurrence.
#[derive(Debug, Clone)]
pub struct BooleanClause {
    /// The sub-query.
    pub query: Box<dyn Query>,
    /// Whether the sub-query is required.
    pub occur: Occur,
}

impl fmt::Display for BooleanClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occur {
            Occur::Must => write!(f, "+{}", self.query.description()),
            Occur::Should => f.write_str(&self.query.description()),
        }
    }
}

/// A query combining MUST and SHOULD clauses.
///
/// Every MUST clause has to match. Without MUST clauses at least one SHOULD
/// clause has to match; with them, SHOULD clauses only add score. A
/// document's score is the sum of its matching clause scores.
#[derive(Debug, Clone, Default)]
pub struct BooleanQuery {
    clauses: Vec<BooleanClause>,
}

impl BooleanQuery {
    /// Create a new empty boolean query. It matches nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause that must match.
    pub fn add_must(&mut self, query: Box<dyn Query>) {
        self.clauses.push(BooleanClause {
            query,
            occur: Occur::Must,
        });
    }

    /// Add a clause that should match.
    pub fn add_should(&mut self, query: Box<dyn Query>) {
        self.clauses.push(BooleanClause {
            query,
            occur: Occur::Should,
        });
    }

    /// Get the clauses.
    pub fn clauses(&self) -> &[BooleanClause] {
        &self.clauses
    }

    fn with_occur(&self, occur: Occur) -> impl Iterator<Item = &BooleanClause> {
        self.clauses.iter().filter(move |c| c.occur == occur)
    }
}

impl Query for BooleanQuery {
    fn matcher<'a>(
        &self,
        reader: &'a InvertedIndexReader,
        bm25: &Bm25Config,
    ) -> Result<Box<dyn Matcher + 'a>> {
        if self.is_empty(reader) {
            return Ok(Box::new(EmptyMatcher::new()));
        }

        let mut required = self
            .with_occur(Occur::Must)
            .map(|c| c.query.matcher(reader, bm25))
            .collect::<Result<Vec<_>>>()?;
        let mut optional = self
            .with_occur(Occur::Should)
            .filter(|c| !c.query.is_empty(reader))
            .map(|c| c.query.matcher(reader, bm25))
            .collect::<Result<Vec<_>>>()?;

        let optional = match optional.len() {
            0 => None,
            1 => Some(optional.remove(0)),
            _ => Some(Box::new(DisjunctionMatcher::new(optional)) as Box<dyn Matcher + 'a>),
        };
        let required = match required.len() {
            0 => None,
            1 => Some(required.remove(0)),
            _ => Some(Box::new(ConjunctionMatcher::new(required)?) as Box<dyn Matcher + 'a>),
        };

        Ok(match (required, optional) {
            (Some(required), Some(optional)) => Box::new(ReqOptMatcher::new(required, optional)?),
            (Some(matcher), None) | (None, Some(matcher)) => matcher,
            (None, None) => Box::new(EmptyMatcher::new()),
        })
    }

    fn description(&self) -> String {
        let parts: Vec<String> = self.clauses.iter().map(|c| c.to_string()).collect();
        format!("({})", parts.join(" "))
    }

    fn clone_box(&self) -> Box<dyn Query> {
        Box::new(self.clone())
    }

    fn is_empty(&self, reader: &InvertedIndexReader) -> bool {
        let mut musts = self.with_occur(Occur::Must).peekable();
        if musts.peek().is_some() {
            return musts.any(|c| c.query.is_empty(reader));
        }
        self.with_occur(Occur::Should).all(|c| c.query.is_empty(reader))
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.clauses.iter().flat_map(|c| c.query.fields()).collect();
        fields.sort();
        fields.dedup();
        fields
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::document::PaperDocument;
    use crate::lexical::index::inverted::{InvertedIndexWriter, InvertedIndexWriterConfig};
    use crate::query::phrase::PhraseQuery;
    use crate::query::term::TermQuery;
    use crate::storage::memory::MemoryStorage;

    fn reader(titles: &[&str]) -> InvertedIndexReader {
        let storage = Arc::new(MemoryStorage::new());
        let mut writer =
            InvertedIndexWriter::create(storage, InvertedIndexWriterConfig::default()).unwrap();
        for (i, title) in titles.iter().enumerate() {
            let name = format!("{i}.txt");
            writer
                .add_document(PaperDocument::new(&name, &name, *title, ""))
                .unwrap();
        }
        writer.commit().unwrap()
    }

    fn docs(query: &BooleanQuery, reader: &InvertedIndexReader) -> Vec<u64> {
        let mut matcher = query.matcher(reader, &Bm25Config::default()).unwrap();
        let mut docs = Vec::new();
        while !matcher.is_exhausted() {
            docs.push(matcher.doc_id());
            matcher.next().unwrap();
        }
        docs
    }

    fn title(term: &str) -> Box<dyn Query> {
        Box::new(TermQuery::new(Field::Title, term))
    }

    #[test]
    fn test_description_and_fields() {
        let mut query = BooleanQuery::new();
        query.add_must(title("neural"));
        query.add_must(Box::new(PhraseQuery::new(
            Field::Abstract,
            vec!["graph", "networks"],
        )));
        query.add_should(title("deep"));

        assert_eq!(query.clauses().len(), 3);
        assert_eq!(query.clauses()[2].occur, Occur::Should);
        assert_eq!(query.fields(), vec![Field::Title, Field::Abstract]);
        assert_eq!(
            query.description(),
            "(+title:neural +abstract:\"graph networks\" title:deep)"
        );
    }

    #[test]
    fn test_should_needs_one_match() {
        let reader = reader(&["Graph Kernels", "Transformer Models", "Protein Folding"]);

        let mut query = BooleanQuery::new();
        query.add_should(title("graph"));
        query.add_should(title("transformer"));
        query.add_should(title("missing"));

        assert!(!query.is_empty(&reader));
        assert_eq!(docs(&query, &reader), vec![0, 1]);

        let mut nothing = BooleanQuery::new();
        nothing.add_should(title("missing"));
        assert!(nothing.is_empty(&reader));
        assert!(docs(&nothing, &reader).is_empty());
    }

    #[test]
    fn test_must_with_optional_should() {
        let reader = reader(&["Graph Kernels", "Graph Transformer", "Transformer Models"]);

        let mut query = BooleanQuery::new();
        query.add_must(title("graph"));
        query.add_should(title("transformer"));
        assert_eq!(docs(&query, &reader), vec![0, 1]);

        // A missing required clause empties the query.
        query.add_must(title("missing"));
        assert!(query.is_empty(&reader));
        assert!(docs(&query, &reader).is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let reader = reader(&["Graph Kernels"]);
        let query = BooleanQuery::new();

        assert!(query.is_empty(&reader));
        assert!(docs(&query, &reader).is_empty());
        assert_eq!(query.description(), "()");
    }
}
