pub mod error;
pub mod pdf;
pub mod pptx;
pub mod types;

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

pub use error::DocumentError;
pub use types::{Chunk, ChunkKind, IMAGE_PLACEHOLDER};

/// Lines starting with a bullet glyph or an enumeration (`1.`, `a)`, ...).
/// Losing list structure materially degrades citation and answer quality,
/// so classification errs toward treating a line as a list item.
pub(crate) static LIST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-•*·○]|\d+[.)]|[a-z][.)])\s*").expect("valid regex"));

/// Extract structure-tagged chunks from a raw document, dispatching on the
/// file extension of `source_name`. Chunks come back in document reading
/// order: page/slide order, block order within a page.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedFormat`] for unknown extensions,
/// [`DocumentError::Parse`] for corrupt streams, and
/// [`DocumentError::NoContent`] when extraction yields zero chunks. In all
/// cases no chunks are produced and the caller's prior index is unaffected.
pub fn extract(source_name: &str, bytes: &[u8]) -> Result<Vec<Chunk>, DocumentError> {
    let ext = Path::new(source_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let chunks = match ext.as_str() {
        "pdf" => pdf::extract(source_name, bytes)?,
        "pptx" | "ppt" => pptx::extract(source_name, bytes)?,
        _ => return Err(DocumentError::UnsupportedFormat(source_name.to_owned())),
    };

    if chunks.is_empty() {
        return Err(DocumentError::NoContent(source_name.to_owned()));
    }
    tracing::debug!(source = source_name, chunks = chunks.len(), "document extracted");
    Ok(chunks)
}

/// Read a document from disk and extract it. The file name becomes the
/// chunk source identifier.
///
/// # Errors
///
/// Returns [`DocumentError::Io`] if the file cannot be read, otherwise as
/// [`extract`].
pub fn extract_path(path: &Path) -> Result<Vec<Chunk>, DocumentError> {
    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| path.display().to_string(), str::to_owned);
    let bytes = std::fs::read(path)?;
    extract(&source_name, &bytes)
}
