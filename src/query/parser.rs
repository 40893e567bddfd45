//! Query parser for the `field:expression[,field:expression]` syntax.
//!
//! # Syntax
//!
//! - Clauses are separated by commas outside double quotes, at most
//!   [`MAX_CLAUSES`] of them.
//! - Each clause is `field:expression`, split on the first colon. The field
//!   must be `title` or `abstract`.
//! - An expression is a sequence of bare words and `"quoted phrases"`.
//!
//! Every clause must match. Within a clause, the words and phrases are
//! alternatives and at least one of them must match; more matches score
//! higher. Each expression is analyzed with its field's analyzer. A word
//! that analyzes to several terms (such as `graph-based` in a title) adds
//! each term as an alternative, and only quoted text becomes a phrase. An
//! expression whose words all analyze away (`abstract:the`) matches nothing.
//!
//! # Examples
//!
//! ```
//! use papersift::query::parser::QueryParser;
//! use papersift::schema::{Field, FieldAnalyzers};
//!
//! let parser = QueryParser::new(FieldAnalyzers::new().unwrap());
//! let parsed = parser.parse("title:neural,abstract:\"graph networks\"").unwrap();
//!
//! assert!(parsed.touches(Field::Title));
//! assert!(parsed.touches(Field::Abstract));
//! ```

use std::collections::BTreeSet;

use crate::error::{ParseError, Result};
use crate::lexical::index::inverted::InvertedIndexReader;
use crate::query::boolean::BooleanQuery;
use crate::query::match_none::MatchNoneQuery;
use crate::query::phrase::PhraseQuery;
use crate::query::query::Query;
use crate::query::term::TermQuery;
use crate::schema::{Field, FieldAnalyzers};

/// Maximum number of comma-separated clauses.
pub const MAX_CLAUSES: usize = 2;

/// A parsed query with the fields it searches.
#[derive(Debug, Clone)]
pub struct ParsedQuery {
    /// The query tree.
    pub query: Box<dyn Query>,
    /// Fields named by the query's clauses.
    pub fields: BTreeSet<Field>,
}

impl ParsedQuery {
    /// Whether the query searches `field`.
    pub fn touches(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

/// Turns query strings into query trees.
#[derive(Debug, Clone)]
pub struct QueryParser {
    analyzers: FieldAnalyzers,
}

impl QueryParser {
    /// Create a parser using `analyzers` for query-side analysis.
    pub fn new(analyzers: FieldAnalyzers) -> Self {
        QueryParser { analyzers }
    }

    /// Create a parser that analyzes like the index `reader` was built.
    pub fn for_reader(reader: &InvertedIndexReader) -> Self {
        Self::new(reader.analyzers().clone())
    }

    /// Parse a query string.
    pub fn parse(&self, query: &str) -> Result<ParsedQuery> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyQuery.into());
        }

        let clauses = split_clauses(trimmed);
        if clauses.len() > MAX_CLAUSES {
            return Err(ParseError::TooManyClauses {
                query: trimmed.to_string(),
                found: clauses.len(),
                max: MAX_CLAUSES,
            }
            .into());
        }

        let mut boolean = BooleanQuery::new();
        let mut fields = BTreeSet::new();
        for (index, clause) in clauses.into_iter().enumerate() {
            let clause = clause.trim();
            if clause.is_empty() {
                return Err(ParseError::EmptyClause {
                    index: index + 1,
                    query: trimmed.to_string(),
                }
                .into());
            }

            let (field, expression) = parse_clause(clause)?;
            boolean.add_must(self.parse_expression(field, expression)?);
            fields.insert(field);
        }

        log::debug!("Parsed query '{trimmed}' as {}", boolean.description());
        Ok(ParsedQuery {
            query: Box::new(boolean),
            fields,
        })
    }

    /// Turn an expression into a query over `field`.
    fn parse_expression(&self, field: Field, expression: &str) -> Result<Box<dyn Query>> {
        let mut alternatives: Vec<Box<dyn Query>> = Vec::new();

        for item in split_items(expression)? {
            let (text, quoted) = match item {
                Item::Word(text) => (text, false),
                Item::Phrase(text) => (text, true),
            };

            let terms: Vec<(String, u32)> = self
                .analyzers
                .for_field(field)
                .analyze(text)?
                .map(|token| (token.text, token.position as u32))
                .collect();

            if terms.is_empty() {
                continue;
            }
            if quoted {
                alternatives.push(Box::new(PhraseQuery::with_positions(field, terms)));
            } else {
                alternatives.extend(
                    terms
                        .into_iter()
                        .map(|(term, _)| Box::new(TermQuery::new(field, term)) as Box<dyn Query>),
                );
            }
        }

        if alternatives.len() <= 1 {
            return Ok(alternatives
                .pop()
                .unwrap_or_else(|| Box::new(MatchNoneQuery::new(field))));
        }

        let mut any = BooleanQuery::new();
        for query in alternatives {
            any.add_should(query);
        }
        Ok(Box::new(any))
    }
}

/// Split on commas that are not inside double quotes.
fn split_clauses(query: &str) -> Vec<&str> {
    let mut clauses = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    for (i, c) in query.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                clauses.push(&query[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    clauses.push(&query[start..]);
    clauses
}

/// Split a clause into its field and expression.
fn parse_clause(clause: &str) -> std::result::Result<(Field, &str), ParseError> {
    let (name, expression) = clause.split_once(':').ok_or_else(|| ParseError::MissingColon {
        clause: clause.to_string(),
    })?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::EmptyField {
            clause: clause.to_string(),
        });
    }
    let field = Field::parse_queryable(name)?;

    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ParseError::EmptyExpression {
            field: name.to_string(),
        });
    }
    Ok((field, expression))
}

#[derive(Debug, PartialEq, Eq)]
enum Item<'a> {
    Word(&'a str),
    Phrase(&'a str),
}

/// Split an expression into bare words and quoted phrases.
fn split_items(expression: &str) -> std::result::Result<Vec<Item<'_>>, ParseError> {
    let mut items = Vec::new();
    let mut rest = expression;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(items);
        }

        if let Some(after_quote) = rest.strip_prefix('"') {
            let end = after_quote
                .find('"')
                .ok_or_else(|| ParseError::UnterminatedPhrase {
                    expression: expression.to_string(),
                })?;
            items.push(Item::Phrase(&after_quote[..end]));
            rest = &after_quote[end + 1..];
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '"')
                .unwrap_or(rest.len());
            items.push(Item::Word(&rest[..end]));
            rest = &rest[end..];
        }
    }
}
