//! In-memory vector index over document chunks, with JSON persistence.
//!
//! Vectors live in one file, their chunks in a `.meta.json` sidecar next to
//! it. The two are written and loaded together; a length mismatch means the
//! pair is corrupt and the index refuses to load.

use std::ffi::OsString;
use std::path::Path;

use sage_llm::provider::EmbedFn;
use serde::{Deserialize, Serialize};

use crate::document::Chunk;
use crate::error::IndexError;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// A chunk returned from search along with its cosine similarity.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embed every chunk and build a fresh index. Chunks with empty text or
    /// a failed embedding are skipped with a warning so one bad chunk does
    /// not sink the document.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::NoContent`] when no chunk survives.
    pub async fn build(chunks: Vec<Chunk>, embed: &EmbedFn) -> Result<Self, IndexError> {
        let mut entries = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            if chunk.text.trim().is_empty() {
                tracing::warn!(source = %chunk.source, "skipping empty chunk");
                continue;
            }
            match embed(&chunk.text).await {
                Ok(vector) => entries.push(IndexEntry { chunk, vector }),
                Err(e) => {
                    tracing::warn!(source = %chunk.source, error = %e, "embedding failed, chunk dropped");
                }
            }
        }
        if entries.is_empty() {
            return Err(IndexError::NoContent);
        }
        tracing::info!(entries = entries.len(), "index built");
        Ok(Self { entries })
    }

    /// The `limit` most similar chunks, best first. Ties keep insertion
    /// order, so results are deterministic for a given index.
    #[must_use]
    pub fn search(&self, query: &[f32], limit: usize) -> Vec<ScoredChunk> {
        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        scored
    }

    /// Missing parent directories are created, so a fresh checkout can
    /// persist to the default data path.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Persist`] if either file cannot be written.
    pub fn persist(&self, path: &Path) -> Result<(), IndexError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| IndexError::Persist(e.to_string()))?;
            }
        }
        let vectors: Vec<&Vec<f32>> = self.entries.iter().map(|e| &e.vector).collect();
        let chunks: Vec<&Chunk> = self.entries.iter().map(|e| &e.chunk).collect();

        let vector_json =
            serde_json::to_vec(&vectors).map_err(|e| IndexError::Persist(e.to_string()))?;
        let chunk_json =
            serde_json::to_vec(&chunks).map_err(|e| IndexError::Persist(e.to_string()))?;

        std::fs::write(path, vector_json).map_err(|e| IndexError::Persist(e.to_string()))?;
        std::fs::write(sidecar_path(path), chunk_json)
            .map_err(|e| IndexError::Persist(e.to_string()))?;
        tracing::info!(path = %path.display(), entries = self.entries.len(), "index persisted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`IndexError::Load`] when either file is missing, unreadable,
    /// or the vector and chunk counts disagree.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let vector_json = std::fs::read(path).map_err(|e| IndexError::Load(e.to_string()))?;
        let chunk_json =
            std::fs::read(sidecar_path(path)).map_err(|e| IndexError::Load(e.to_string()))?;

        let vectors: Vec<Vec<f32>> =
            serde_json::from_slice(&vector_json).map_err(|e| IndexError::Load(e.to_string()))?;
        let chunks: Vec<Chunk> =
            serde_json::from_slice(&chunk_json).map_err(|e| IndexError::Load(e.to_string()))?;

        if vectors.len() != chunks.len() {
            return Err(IndexError::Load(format!(
                "{} vectors but {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();
        Ok(Self { entries })
    }

    /// Remove the persisted index, its sidecar, and any leftover temp files
    /// sharing the index's file stem. Best effort: returns whether anything
    /// was removed. Clearing an absent index is not an error, it just
    /// reports `false` so the caller can word its message accordingly.
    pub fn clear(path: &Path) -> bool {
        let mut removed = std::fs::remove_file(path).is_ok();
        removed |= std::fs::remove_file(sidecar_path(path)).is_ok();

        let (Some(parent), Some(stem)) = (path.parent(), path.file_stem().and_then(|s| s.to_str()))
        else {
            return removed;
        };
        let prefix = format!("{stem}_");
        if let Ok(dir) = std::fs::read_dir(parent) {
            for entry in dir.flatten() {
                let name = entry.file_name();
                if name.to_string_lossy().starts_with(&prefix) {
                    removed |= std::fs::remove_file(entry.path()).is_ok();
                }
            }
        }
        removed
    }
}

fn sidecar_path(path: &Path) -> OsString {
    let mut sidecar = path.as_os_str().to_owned();
    sidecar.push(".meta.json");
    sidecar
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
