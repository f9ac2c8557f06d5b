//! Builds the citation-annotated context block that retrieval results are
//! handed to the model as.

use sage_memory::{ChunkKind, ScoredChunk};

/// Render ranked chunks as context: each chunk's text followed by its
/// citation line and a `---` separator, blocks joined by blank lines.
#[must_use]
pub fn assemble(ranked: &[ScoredChunk]) -> String {
    ranked
        .iter()
        .map(|hit| {
            format!(
                "{}\n{}\n---\n",
                hit.chunk.text,
                citation(&hit.chunk.source, &hit.chunk.kind)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Human-readable provenance for one chunk. Missing metadata degrades to a
/// fixed sentinel rather than failing the whole context.
#[must_use]
pub fn citation(source: &str, kind: &ChunkKind) -> String {
    if source.trim().is_empty() {
        return "(Source information unavailable)".to_owned();
    }
    match kind {
        ChunkKind::Slide {
            number,
            title: Some(title),
            ..
        } => format!("[From Slide {number} in {source}: \"{title}\"]"),
        ChunkKind::Slide {
            number,
            title: None,
            ..
        } => format!("[From Slide {number} in {source}]"),
        ChunkKind::Page { number } | ChunkKind::Image { number } | ChunkKind::Table { number } => {
            format!("[From Page {number} in {source}]")
        }
    }
}
