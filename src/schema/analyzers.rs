//! Analyzer instances behind each analysis profile.

use std::sync::Arc;

use crate::analysis::analyzer::{Analyzer, KeywordAnalyzer, StandardAnalyzer, TitleAnalyzer};
use crate::analysis::token_filter::stop::DEFAULT_ENGLISH_STOP_WORDS;
use crate::error::Result;
use crate::schema::field::{AnalysisProfile, Field};

/// One analyzer per profile, shared by the writer and the query parser.
///
/// The stop word list is part of the index: a reader rebuilds its analyzers
/// from the list recorded at commit time so queries normalize exactly like
/// the indexed text did.
#[derive(Clone)]
pub struct FieldAnalyzers {
    standard: Arc<dyn Analyzer>,
    title: Arc<dyn Analyzer>,
    keyword: Arc<dyn Analyzer>,
    stop_words: Vec<String>,
}

impl FieldAnalyzers {
    /// Build analyzers with the default English stop words.
    pub fn new() -> Result<Self> {
        Self::with_stop_words(DEFAULT_ENGLISH_STOP_WORDS.iter().map(|s| s.to_string()))
    }

    /// Build analyzers with a custom stop word list for the standard profile.
    pub fn with_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut stop_words: Vec<String> = stop_words.into_iter().map(Into::into).collect();
        stop_words.sort();
        stop_words.dedup();

        Ok(FieldAnalyzers {
            standard: Arc::new(StandardAnalyzer::with_stop_words(stop_words.clone())?),
            title: Arc::new(TitleAnalyzer::new()),
            keyword: Arc::new(KeywordAnalyzer::new()),
            stop_words,
        })
    }

    /// The analyzer for a profile.
    pub fn for_profile(&self, profile: AnalysisProfile) -> &Arc<dyn Analyzer> {
        match profile {
            AnalysisProfile::Standard => &self.standard,
            AnalysisProfile::Title => &self.title,
            AnalysisProfile::Keyword => &self.keyword,
        }
    }

    /// The analyzer for a field.
    pub fn for_field(&self, field: Field) -> &Arc<dyn Analyzer> {
        self.for_profile(field.profile())
    }

    /// The stop words used by the standard profile, sorted.
    pub fn stop_words(&self) -> &[String] {
        &self.stop_words
    }
}

impl std::fmt::Debug for FieldAnalyzers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldAnalyzers")
            .field("standard", &self.standard.name())
            .field("title", &self.title.name())
            .field("keyword", &self.keyword.name())
            .field("stop_words", &self.stop_words.len())
            .finish()
    }
}
