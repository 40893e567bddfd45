//! Word delimiter filter.
//!
//! Splits each token into sub-words so that compound title words are
//! searchable piece by piece:
//!
//! - on any character that is not a letter or digit (`graph-based`, `self_attention`, `(BERT)`);
//! - on letter/digit transitions (`gpt4` → `gpt`, `4`);
//! - on lower→upper case changes (`PowerShot` → `Power`, `Shot`) and before the
//!   last capital of an acronym run (`XMLParser` → `XML`, `Parser`).
//!
//! A trailing English possessive (`'s`) is dropped. Every emitted part takes
//! the next position in the stream, so adjacent parts of one word are also
//! adjacent for phrase matching.
//!
//! # Examples
//!
//! ```
//! use papersift::analysis::token_filter::Filter;
//! use papersift::analysis::token_filter::word_delimiter::WordDelimiterFilter;
//! use papersift::analysis::token::Token;
//!
//! let filter = WordDelimiterFilter::new();
//! let tokens = vec![Token::new("graph-based", 0), Token::new("gpt4", 1)];
//! let parts: Vec<String> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .map(|t| t.text)
//!     .collect();
//!
//! assert_eq!(parts, vec!["graph", "based", "gpt", "4"]);
//! ```

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CharClass {
    Lower,
    Upper,
    Digit,
    Delimiter,
}

impl CharClass {
    fn of(ch: char) -> Self {
        if ch.is_numeric() {
            CharClass::Digit
        } else if ch.is_alphabetic() {
            if ch.is_uppercase() {
                CharClass::Upper
            } else {
                CharClass::Lower
            }
        } else {
            CharClass::Delimiter
        }
    }

    fn is_letter(self) -> bool {
        matches!(self, CharClass::Lower | CharClass::Upper)
    }
}

/// A filter that splits tokens on word-internal delimiters.
#[derive(Clone, Debug, Default)]
pub struct WordDelimiterFilter;

impl WordDelimiterFilter {
    /// Create a new word delimiter filter.
    pub fn new() -> Self {
        WordDelimiterFilter
    }

    /// Split one word into `(start, end)` byte ranges of its parts.
    fn split(word: &str) -> Vec<(usize, usize)> {
        let word = strip_possessive(word);
        let chars: Vec<(usize, char, CharClass)> = word
            .char_indices()
            .map(|(i, ch)| (i, ch, CharClass::of(ch)))
            .collect();

        let mut parts = Vec::new();
        let mut start: Option<usize> = None;

        for (idx, &(offset, _, class)) in chars.iter().enumerate() {
            if class == CharClass::Delimiter {
                if let Some(s) = start.take() {
                    parts.push((s, offset));
                }
                continue;
            }

            if let Some(s) = start {
                let prev = chars[idx - 1].2;
                let next = chars.get(idx + 1).map(|c| c.2);

                let boundary = (prev == CharClass::Digit && class.is_letter())
                    || (prev.is_letter() && class == CharClass::Digit)
                    || (prev == CharClass::Lower && class == CharClass::Upper)
                    || (prev == CharClass::Upper
                        && class == CharClass::Upper
                        && next == Some(CharClass::Lower));

                if boundary {
                    parts.push((s, offset));
                    start = Some(offset);
                }
            } else {
                start = Some(offset);
            }
        }

        if let Some(s) = start {
            parts.push((s, word.len()));
        }

        parts
    }
}

fn strip_possessive(word: &str) -> &str {
    for suffix in ["'s", "'S", "\u{2019}s", "\u{2019}S"] {
        if let Some(stem) = word.strip_suffix(suffix)
            && stem.chars().last().is_some_and(char::is_alphanumeric)
        {
            return stem;
        }
    }
    word
}

impl Filter for WordDelimiterFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut position = 0;
        let mut output = Vec::new();

        for token in tokens {
            for (start, end) in Self::split(&token.text) {
                output.push(Token::with_offsets(
                    &token.text[start..end],
                    position,
                    token.start_offset + start,
                    token.start_offset + end,
                ));
                position += 1;
            }
        }

        Ok(Box::new(output.into_iter()))
    }

    fn name(&self) -> &'static str {
        "word_delimiter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(text: &str) -> Vec<String> {
        WordDelimiterFilter::split(text)
            .into_iter()
            .map(|(s, e)| text[s..e].to_string())
            .collect()
    }

    #[test]
    fn test_delimiters() {
        assert_eq!(parts("graph-based"), vec!["graph", "based"]);
        assert_eq!(parts("self_attention"), vec!["self", "attention"]);
        assert_eq!(parts("(bert)"), vec!["bert"]);
        assert_eq!(parts("learning:"), vec!["learning"]);
        assert!(parts("--").is_empty());
    }

    #[test]
    fn test_digit_letter_boundaries() {
        assert_eq!(parts("gpt4"), vec!["gpt", "4"]);
        assert_eq!(parts("3d-cnns"), vec!["3", "d", "cnns"]);
        assert_eq!(parts("2024"), vec!["2024"]);
    }

    #[test]
    fn test_case_changes() {
        assert_eq!(parts("PowerShot"), vec!["Power", "Shot"]);
        assert_eq!(parts("XMLParser"), vec!["XML", "Parser"]);
        assert_eq!(parts("BERT"), vec!["BERT"]);
    }

    #[test]
    fn test_possessive() {
        assert_eq!(parts("model's"), vec!["model"]);
        assert_eq!(parts("Hilbert\u{2019}s"), vec!["Hilbert"]);
    }

    #[test]
    fn test_positions_and_offsets() {
        let filter = WordDelimiterFilter::new();
        let tokens = vec![
            Token::with_offsets("graph-based", 0, 0, 11),
            Token::with_offsets("—", 1, 12, 15),
            Token::with_offsets("models", 2, 16, 22),
        ];

        let result: Vec<Token> = filter
            .filter(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 3);
        assert_eq!(result[0].text, "graph");
        assert_eq!(result[0].position, 0);
        assert_eq!(result[1].text, "based");
        assert_eq!(result[1].position, 1);
        assert_eq!(result[1].start_offset, 6);
        assert_eq!(result[1].end_offset, 11);
        assert_eq!(result[2].text, "models");
        assert_eq!(result[2].position, 2);
    }
}
