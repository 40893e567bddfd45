//! In-memory and on-disk structures of the inverted index.

pub mod posting;
pub mod terms;

pub use posting::*;
pub use terms::*;
