//! Tokenizers: the first stage of every analysis pipeline.
//!
//! A tokenizer assigns consecutive positions starting at 0. Filters later in
//! the pipeline may drop tokens but never renumber the survivors.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod regex;
pub mod whitespace;
pub mod whole;

pub use regex::RegexTokenizer;
pub use whitespace::WhitespaceTokenizer;
pub use whole::WholeTokenizer;

/// Splits field text into positioned tokens.
pub trait Tokenizer: Send + Sync {
    /// Tokenize `text`. Empty input yields an empty stream.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Short identifier used in analyzer descriptions.
    fn name(&self) -> &'static str;
}
