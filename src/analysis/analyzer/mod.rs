//! Analyzer implementations that combine tokenizers and filters.

pub mod analyzer;
pub mod keyword;
pub mod pipeline;
pub mod standard;
pub mod title;

pub use analyzer::Analyzer;
pub use keyword::KeywordAnalyzer;
pub use pipeline::PipelineAnalyzer;
pub use standard::StandardAnalyzer;
pub use title::TitleAnalyzer;
