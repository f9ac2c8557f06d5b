//! Document extraction into provenance-tagged chunks, plus the in-memory
//! vector index they are searched through.

pub mod document;
pub mod error;
pub mod index;

pub use document::{Chunk, ChunkKind, DocumentError, IMAGE_PLACEHOLDER, extract, extract_path};
pub use error::IndexError;
pub use index::{ScoredChunk, VectorIndex};
