//! Storage abstraction layer.
//!
//! The index writer and reader only talk to [`Storage`], so the same code
//! persists to a directory on disk ([`FileStorage`]) or to memory
//! ([`MemoryStorage`], used heavily in tests).

pub mod file;
pub mod memory;
pub mod structured;
pub mod traits;

pub use file::*;
pub use memory::*;
pub use structured::*;
pub use traits::*;
