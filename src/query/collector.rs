//! Collector implementations for gathering search results.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::Debug;

use crate::query::SearchHit;

/// Trait for collecting search results.
pub trait Collector: Send + Debug {
    /// Collect a document hit.
    fn collect(&mut self, doc_id: u64, score: f32);

    /// Get the total number of hits collected.
    fn total_hits(&self) -> u64;

    /// Best score seen so far, 0 without hits.
    fn max_score(&self) -> f32;
}

/// A collector that keeps the top N documents by score.
///
/// Ties are broken by ascending document id, so results do not depend on
/// the order documents are collected in.
#[derive(Debug)]
pub struct TopDocsCollector {
    /// Maximum number of documents to collect.
    max_docs: usize,
    /// Collected hits; the heap top is the worst kept hit.
    hits: BinaryHeap<ScoredDoc>,
    /// Total number of documents processed.
    total_hits: u64,
    /// Best score seen.
    max_score: f32,
}

/// A scored document for use in the heap.
#[derive(Debug, Clone, Copy)]
struct ScoredDoc {
    doc_id: u64,
    score: f32,
}

impl ScoredDoc {
    /// Ranking order: higher score first, then lower doc id.
    fn rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialEq for ScoredDoc {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScoredDoc {}

impl PartialOrd for ScoredDoc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScoredDoc {
    // Max-heap on rank: the worst-ranked hit sits on top.
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank(other)
    }
}

impl TopDocsCollector {
    /// Create a new top docs collector.
    pub fn new(max_docs: usize) -> Self {
        TopDocsCollector {
            max_docs,
            hits: BinaryHeap::with_capacity(max_docs.min(1024)),
            total_hits: 0,
            max_score: 0.0,
        }
    }

    /// Get the maximum number of documents to collect.
    pub fn max_docs(&self) -> usize {
        self.max_docs
    }

    /// The kept hits, best first. Stored fields are not loaded.
    pub fn into_hits(self) -> Vec<SearchHit> {
        let mut docs = self.hits.into_vec();
        docs.sort_by(ScoredDoc::rank);
        docs.into_iter()
            .map(|doc| SearchHit {
                doc_id: doc.doc_id,
                score: doc.score,
                document: None,
            })
            .collect()
    }
}

impl Collector for TopDocsCollector {
    fn collect(&mut self, doc_id: u64, score: f32) {
        if self.total_hits == 0 || score > self.max_score {
            self.max_score = score;
        }
        self.total_hits += 1;

        if self.max_docs == 0 {
            return;
        }

        let scored_doc = ScoredDoc { doc_id, score };
        if self.hits.len() < self.max_docs {
            self.hits.push(scored_doc);
        } else if let Some(mut worst) = self.hits.peek_mut() {
            if scored_doc.rank(&worst) == Ordering::Less {
                *worst = scored_doc;
            }
        }
    }

    fn total_hits(&self) -> u64 {
        self.total_hits
    }

    fn max_score(&self) -> f32 {
        self.max_score
    }
}
