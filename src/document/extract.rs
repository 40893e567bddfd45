//! Heuristic title and abstract extraction from paper text.
//!
//! Papers are plain-text conversions whose leading lines look like
//!
//! ```text
//! Title: Attention Is All You Need
//! Abstract: The dominant sequence transduction models ...
//! ... continued abstract ...
//!
//! 1. Introduction
//! ```
//!
//! The title is the remainder of the first `Title:` line. The abstract starts
//! at the first `Abstract:` line and runs until a section header or the end
//! of the file.

use std::sync::LazyLock;

use regex::Regex;

/// Title used when a paper has no usable `Title:` line.
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Abstract used when a paper has no usable `Abstract:` section.
pub const NO_ABSTRACT: &str = "No abstract available";

const TITLE_PREFIX: &str = "title:";
const ABSTRACT_PREFIX: &str = "abstract:";

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:(?:introduction|references|keywords|acknowledgments|conclusions?)\b|1\.|i\.)")
        .unwrap_or_else(|e| panic!("invalid section header pattern: {e}"))
});

/// Title and abstract extracted from one paper.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedFields {
    pub title: String,
    pub abstract_text: String,
}

impl ExtractedFields {
    /// Extract both fields from the full text of a paper.
    pub fn from_text(text: &str) -> Self {
        ExtractedFields {
            title: extract_title(text),
            abstract_text: extract_abstract(text),
        }
    }
}

/// The title of a paper, or [`UNKNOWN_TITLE`].
pub fn extract_title(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .find_map(|line| strip_prefix_ignore_case(line, TITLE_PREFIX))
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map_or_else(|| UNKNOWN_TITLE.to_string(), str::to_string)
}

/// The abstract of a paper, or [`NO_ABSTRACT`].
pub fn extract_abstract(text: &str) -> String {
    let mut lines = text.lines().map(str::trim);

    let Some(first) = lines
        .by_ref()
        .find_map(|line| strip_prefix_ignore_case(line, ABSTRACT_PREFIX))
    else {
        return NO_ABSTRACT.to_string();
    };

    let mut parts = Vec::new();
    let first = first.trim();
    if !first.is_empty() {
        parts.push(first);
    }
    parts.extend(
        lines
            .take_while(|line| !is_section_header(line))
            .filter(|line| !line.is_empty()),
    );

    if parts.is_empty() {
        NO_ABSTRACT.to_string()
    } else {
        parts.join(" ")
    }
}

/// Whether a trimmed line opens a section that ends the abstract.
pub fn is_section_header(line: &str) -> bool {
    SECTION_HEADER.is_match(line)
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title("Title: Deep Learning\nAbstract: x"), "Deep Learning");
        assert_eq!(extract_title("   TITLE:   Spaced Out  "), "Spaced Out");
        assert_eq!(extract_title("preamble\ntitle: Second: Part"), "Second: Part");
        assert_eq!(extract_title("Title:\nTitle: Later"), UNKNOWN_TITLE);
        assert_eq!(extract_title("no title here"), UNKNOWN_TITLE);
        assert_eq!(extract_title(""), UNKNOWN_TITLE);
    }

    #[test]
    fn test_extract_abstract() {
        let text = "Title: X\nAbstract: First line.\n  second line  \n\nthird\nIntroduction\nbody";
        assert_eq!(extract_abstract(text), "First line. second line third");
    }

    #[test]
    fn test_abstract_stops_at_numbered_header() {
        let text = "Abstract:\nWe propose a model.\n1. Introduction\nMore text";
        assert_eq!(extract_abstract(text), "We propose a model.");

        let text = "Abstract: Short.\nI. INTRODUCTION\nMore text";
        assert_eq!(extract_abstract(text), "Short.");

        let text = "Abstract: Short.\nKeywords: graphs, learning";
        assert_eq!(extract_abstract(text), "Short.");

        let text = "Abstract: Short.\nConclusion\nDone";
        assert_eq!(extract_abstract(text), "Short.");
    }

    #[test]
    fn test_abstract_header_needs_word_boundary() {
        let text = "Abstract: We revisit\nintroductions of priors.\nReferences";
        assert_eq!(extract_abstract(text), "We revisit introductions of priors.");
    }

    #[test]
    fn test_abstract_missing_or_empty() {
        assert_eq!(extract_abstract("Title: X\nbody"), NO_ABSTRACT);
        assert_eq!(extract_abstract("Abstract:\n\nIntroduction"), NO_ABSTRACT);
        assert_eq!(extract_abstract("Abstract:   "), NO_ABSTRACT);
    }

    #[test]
    fn test_abstract_runs_to_end_of_file() {
        assert_eq!(extract_abstract("abstract: a\nb\nc"), "a b c");
    }

    #[test]
    fn test_prefix_with_multibyte_text() {
        assert_eq!(extract_title("Tí: x"), UNKNOWN_TITLE);
        assert_eq!(extract_title("é"), UNKNOWN_TITLE);
    }
}
