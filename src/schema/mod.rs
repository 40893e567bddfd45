//! The fixed document schema.
//!
//! Papers have exactly four fields. Each [`Field`] carries the
//! [`AnalysisProfile`] used for it at index and query time, and
//! [`FieldAnalyzers`] holds the analyzer instances behind those profiles.

pub mod analyzers;
pub mod field;

pub use analyzers::*;
pub use field::*;
