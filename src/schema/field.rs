//! Field and analysis-profile definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// How a field's text is turned into terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisProfile {
    /// Letters/digits tokenization, lowercase, stop words removed.
    Standard,
    /// Whitespace tokenization, lowercase, word-delimiter splitting.
    Title,
    /// The whole value as one exact term.
    Keyword,
}

/// A field of a paper document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// The source file path as scanned.
    Path,
    /// The final component of the source path.
    Filename,
    /// The extracted title.
    Title,
    /// The extracted abstract.
    Abstract,
}

/// Number of document fields.
pub const FIELD_COUNT: usize = 4;

impl Field {
    /// Every field, in storage order.
    pub const ALL: [Field; FIELD_COUNT] = [Field::Path, Field::Filename, Field::Title, Field::Abstract];

    /// The field name used in queries and output.
    pub fn name(self) -> &'static str {
        match self {
            Field::Path => "path",
            Field::Filename => "filename",
            Field::Title => "title",
            Field::Abstract => "abstract",
        }
    }

    /// The analysis profile applied to this field.
    pub fn profile(self) -> AnalysisProfile {
        match self {
            Field::Path | Field::Filename => AnalysisProfile::Keyword,
            Field::Title => AnalysisProfile::Title,
            Field::Abstract => AnalysisProfile::Standard,
        }
    }

    /// Whether the query parser accepts this field.
    pub fn is_queryable(self) -> bool {
        matches!(self, Field::Title | Field::Abstract)
    }

    /// Fields accepted by the query parser.
    pub fn queryable() -> impl Iterator<Item = Field> {
        Self::ALL.into_iter().filter(|f| f.is_queryable())
    }

    /// Stable numeric id used in the binary index files.
    pub fn id(self) -> u8 {
        match self {
            Field::Path => 0,
            Field::Filename => 1,
            Field::Title => 2,
            Field::Abstract => 3,
        }
    }

    /// Inverse of [`Field::id`].
    pub fn from_id(id: u8) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.id() == id)
    }

    /// Look up a field by its exact name.
    pub fn from_name(name: &str) -> Option<Field> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Resolve a field name typed in a query.
    pub fn parse_queryable(name: &str) -> Result<Field, ParseError> {
        Self::from_name(name)
            .filter(|f| f.is_queryable())
            .ok_or_else(|| ParseError::UnknownField {
                field: name.to_string(),
                expected: Self::queryable()
                    .map(Field::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
