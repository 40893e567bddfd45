//! Token filters applied after tokenization.

use crate::analysis::token::TokenStream;
use crate::error::Result;

pub mod lowercase;
pub mod stop;
pub mod word_delimiter;

pub use lowercase::LowercaseFilter;
pub use stop::StopFilter;
pub use word_delimiter::WordDelimiterFilter;

/// Rewrites, splits or drops tokens of a stream.
pub trait Filter: Send + Sync {
    /// Wrap `tokens` with this filter.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Short identifier used in analyzer descriptions.
    fn name(&self) -> &'static str;
}
