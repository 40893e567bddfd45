//! Searcher implementation for executing queries against a sealed index.

use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::error::Result;
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::collector::{Collector, TopDocsCollector};
use crate::query::parser::QueryParser;
use crate::query::query::Query;
use crate::query::scorer::Bm25Config;
use crate::query::SearchResults;

/// A searcher that executes queries against an index reader.
///
/// The reader is shared and never modified, so a searcher can be cloned
/// cheaply and used from many threads at once.
#[derive(Debug, Clone)]
pub struct IndexSearcher {
    /// The index reader to search against.
    reader: Arc<InvertedIndexReader>,
    /// BM25 parameters.
    bm25: Bm25Config,
}

impl IndexSearcher {
    /// Create a new searcher with default BM25 parameters.
    pub fn new(reader: Arc<InvertedIndexReader>) -> Self {
        Self::with_bm25(reader, Bm25Config::default())
    }

    /// Create a new searcher with custom BM25 parameters.
    pub fn with_bm25(reader: Arc<InvertedIndexReader>, bm25: Bm25Config) -> Self {
        IndexSearcher { reader, bm25 }
    }

    /// Get the index reader.
    pub fn reader(&self) -> &Arc<InvertedIndexReader> {
        &self.reader
    }

    /// The BM25 parameters in use.
    pub fn bm25(&self) -> &Bm25Config {
        &self.bm25
    }

    /// A parser whose analysis matches this index.
    pub fn query_parser(&self) -> QueryParser {
        QueryParser::for_reader(&self.reader)
    }

    /// Number of documents in the index.
    pub fn doc_count(&self) -> u64 {
        self.reader.doc_count()
    }

    /// Return the `top_k` best documents for `query` with their stored fields.
    pub fn search(&self, query: &dyn Query, top_k: usize) -> Result<SearchResults> {
        let start = Instant::now();
        let collector = self.search_with_collector(query, TopDocsCollector::new(top_k))?;

        let total_hits = collector.total_hits();
        let max_score = collector.max_score();
        let mut hits = collector.into_hits();
        for hit in hits.iter_mut() {
            hit.document = Some(self.reader.stored_fields(hit.doc_id)?.clone());
        }

        log::debug!(
            "Query {} matched {total_hits} documents in {:?}",
            query.description(),
            start.elapsed()
        );

        Ok(SearchResults {
            hits,
            total_hits,
            max_score,
        })
    }

    /// Feed every match of `query` into `collector`.
    pub fn search_with_collector<C: Collector>(
        &self,
        query: &dyn Query,
        mut collector: C,
    ) -> Result<C> {
        let mut matcher = query.matcher(&self.reader, &self.bm25)?;

        while !matcher.is_exhausted() {
            collector.collect(matcher.doc_id(), matcher.score());
            matcher.next()?;
        }

        Ok(collector)
    }

    /// Run independent queries in parallel, results in input order.
    pub fn search_batch(
        &self,
        queries: &[Box<dyn Query>],
        top_k: usize,
    ) -> Vec<Result<SearchResults>> {
        queries
            .par_iter()
            .map(|query| self.search(query.as_ref(), top_k))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PaperDocument;
    use crate::lexical::index::inverted::{InvertedIndexWriter, InvertedIndexWriterConfig};
    use crate::storage::memory::MemoryStorage;

    fn searcher(papers: &[(&str, &str)]) -> IndexSearcher {
        let storage = Arc::new(MemoryStorage::new());
        let mut writer =
            InvertedIndexWriter::create(storage, InvertedIndexWriterConfig::default()).unwrap();
        for (i, (title, abstract_text)) in papers.iter().enumerate() {
            let name = format!("{i}.txt");
            writer
                .add_document(PaperDocument::new(&name, &name, *title, *abstract_text))
                .unwrap();
        }
        IndexSearcher::new(Arc::new(writer.commit().unwrap()))
    }

    #[test]
    fn test_search_loads_documents() {
        let searcher = searcher(&[
            ("Graph Neural Networks", "Message passing on graphs."),
            ("Transformers", "Attention for graphs and graphs."),
            ("Decision Trees", "Greedy splits."),
        ]);
        let parsed = searcher.query_parser().parse("abstract:graphs").unwrap();
        let results = searcher.search(parsed.query.as_ref(), 10).unwrap();

        assert_eq!(results.total_hits, 2);
        assert_eq!(results.hits[0].doc_id, 1);
        assert_eq!(results.max_score, results.hits[0].score);
        assert_eq!(
            results.hits[0].document.as_ref().unwrap().title,
            "Transformers"
        );
    }

    #[test]
    fn test_truncation_keeps_total() {
        let searcher = searcher(&[("A", "graphs"), ("B", "graphs"), ("C", "graphs")]);
        let parsed = searcher.query_parser().parse("abstract:graphs").unwrap();
        let results = searcher.search(parsed.query.as_ref(), 2).unwrap();

        assert_eq!(results.total_hits, 3);
        let ids: Vec<u64> = results.hits.iter().map(|h| h.doc_id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn test_no_match() {
        let searcher = searcher(&[("A", "graphs")]);
        let parsed = searcher.query_parser().parse("title:zebra").unwrap();
        let results = searcher.search(parsed.query.as_ref(), 10).unwrap();

        assert!(results.is_empty());
        assert_eq!(results.total_hits, 0);
        assert_eq!(results.max_score, 0.0);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let searcher = searcher(&[
            ("Graph Neural Networks", "graphs"),
            ("Neural Machine Translation", "attention"),
            ("Graph Kernels", "kernels on graphs"),
        ]);
        let parser = searcher.query_parser();
        let queries: Vec<Box<dyn Query>> = ["title:graph", "title:neural", "abstract:attention"]
            .iter()
            .map(|q| parser.parse(q).unwrap().query)
            .collect();

        let batch = searcher.search_batch(&queries, 10);
        for (query, result) in queries.iter().zip(batch) {
            let sequential = searcher.search(query.as_ref(), 10).unwrap();
            let result = result.unwrap();
            assert_eq!(result.total_hits, sequential.total_hits);
            let ids = |r: &SearchResults| r.hits.iter().map(|h| h.doc_id).collect::<Vec<_>>();
            assert_eq!(ids(&result), ids(&sequential));
        }
    }
}
