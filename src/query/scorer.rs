//! BM25 scoring.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    /// Term frequency saturation.
    pub k1: f32,
    /// Length normalization strength.
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Bm25Config { k1: 1.2, b: 0.75 }
    }
}

/// BM25 scorer for one term or phrase in one field.
#[derive(Debug, Clone)]
pub struct BM25Scorer {
    /// Inverse document frequency, summed over the terms of a phrase.
    idf: f32,
    /// Average field length.
    avg_field_length: f32,
    /// BM25 parameters.
    config: Bm25Config,
}

impl BM25Scorer {
    /// Create a scorer for a term found in `doc_freq` of `total_docs` documents.
    pub fn new(doc_freq: u64, total_docs: u64, avg_field_length: f32, config: Bm25Config) -> Self {
        Self::with_idf(Self::idf(doc_freq, total_docs), avg_field_length, config)
    }

    /// Create a scorer with a precomputed IDF.
    pub fn with_idf(idf: f32, avg_field_length: f32, config: Bm25Config) -> Self {
        BM25Scorer {
            idf,
            avg_field_length,
            config,
        }
    }

    /// IDF = ln(1 + (N - df + 0.5) / (df + 0.5)), never negative.
    pub fn idf(doc_freq: u64, total_docs: u64) -> f32 {
        if doc_freq == 0 || total_docs == 0 {
            return 0.0;
        }

        let n = total_docs as f32;
        let df = doc_freq as f32;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// TF component: (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * len / avg_len)).
    pub fn tf(&self, term_freq: f32, field_length: f32) -> f32 {
        if term_freq <= 0.0 {
            return 0.0;
        }

        let norm_factor = if self.avg_field_length > 0.0 {
            1.0 - self.config.b + self.config.b * (field_length / self.avg_field_length)
        } else {
            1.0
        };

        (term_freq * (self.config.k1 + 1.0)) / (term_freq + self.config.k1 * norm_factor)
    }

    /// Score a document.
    pub fn score(&self, term_freq: f32, field_length: f32) -> f32 {
        self.idf * self.tf(term_freq, field_length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idf() {
        assert_eq!(BM25Scorer::idf(0, 10), 0.0);
        assert_eq!(BM25Scorer::idf(3, 0), 0.0);

        // Present in every document: still positive.
        assert!(BM25Scorer::idf(10, 10) > 0.0);

        // Rarer terms weigh more.
        assert!(BM25Scorer::idf(1, 10) > BM25Scorer::idf(5, 10));

        let expected = (1.0f32 + (10.0 - 2.0 + 0.5) / (2.0 + 0.5)).ln();
        assert!((BM25Scorer::idf(2, 10) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_tf_is_monotonic() {
        let scorer = BM25Scorer::new(2, 10, 10.0, Bm25Config::default());
        // tf saturates below idf * (k1 + 1).
        let bound = BM25Scorer::idf(2, 10) * 2.2;
        let mut previous = 0.0;
        for tf in 1..20 {
            let score = scorer.score(tf as f32, 10.0);
            assert!(score > previous);
            assert!(score < bound);
            previous = score;
        }
    }

    #[test]
    fn test_length_normalization() {
        let scorer = BM25Scorer::new(2, 10, 10.0, Bm25Config::default());
        assert!(scorer.score(1.0, 5.0) > scorer.score(1.0, 20.0));

        let flat = BM25Scorer::new(2, 10, 10.0, Bm25Config { k1: 1.2, b: 0.0 });
        assert_eq!(flat.score(1.0, 5.0), flat.score(1.0, 20.0));
    }

    #[test]
    fn test_zero_average_length() {
        let scorer = BM25Scorer::new(1, 1, 0.0, Bm25Config::default());
        assert!(scorer.score(1.0, 0.0).is_finite());
    }
}
