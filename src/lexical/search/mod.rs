//! Search execution over sealed indexes.

pub mod searcher;

pub use searcher::IndexSearcher;
