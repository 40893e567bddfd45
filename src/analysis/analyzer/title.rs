//! Title analyzer.
//!
//! Whitespace tokenization, lowercasing, then word-delimiter splitting, so
//! that every piece of a hyphenated or alphanumeric title word is searchable
//! on its own. Stop words are kept: titles are short and every word counts.
//!
//! # Examples
//!
//! ```
//! use papersift::analysis::analyzer::Analyzer;
//! use papersift::analysis::analyzer::title::TitleAnalyzer;
//!
//! let analyzer = TitleAnalyzer::new();
//! let terms = analyzer.terms("Graph-Based GPT4 Models").unwrap();
//! assert_eq!(terms, vec!["graph", "based", "gpt", "4", "models"]);
//! ```

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::word_delimiter::WordDelimiterFilter;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::error::Result;

/// Whitespace tokenization, lowercasing and word-delimiter splitting.
#[derive(Clone, Debug)]
pub struct TitleAnalyzer {
    inner: PipelineAnalyzer,
}

impl TitleAnalyzer {
    /// Create a new title analyzer.
    pub fn new() -> Self {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(WordDelimiterFilter::new()))
            .with_name("title");

        TitleAnalyzer { inner: analyzer }
    }
}

impl Default for TitleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for TitleAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &'static str {
        "title"
    }
}
