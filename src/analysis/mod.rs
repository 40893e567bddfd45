//! Text analysis: tokenizers, token filters and the analyzers built from them.
//!
//! A field's analyzer runs once at index time and again over query text, so
//! both sides see identical terms and positions.

pub mod analyzer;
pub mod token;
pub mod token_filter;
pub mod tokenizer;

pub use analyzer::*;
pub use token::*;
pub use token_filter::*;
pub use tokenizer::*;
