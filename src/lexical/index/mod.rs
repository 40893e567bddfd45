//! Index construction, persistence and lifecycle.

pub mod builder;
pub mod handle;
pub mod inverted;

pub use builder::{IndexBuilder, IngestEvent, IngestStats, SkippedFile};
pub use handle::IndexHandle;
