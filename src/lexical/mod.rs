//! Lexical search: the inverted index and search execution over it.

pub mod index;
pub mod search;
