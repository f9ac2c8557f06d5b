use serde::{Deserialize, Serialize};

/// Fixed text carried by image chunks.
pub const IMAGE_PLACEHOLDER: &str = "[Image omitted]";

/// Where in a document a chunk came from. Matched exhaustively when
/// rendering citations, so adding a variant forces every renderer to
/// decide how to cite it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChunkKind {
    Page {
        number: u32,
    },
    Slide {
        number: u32,
        title: Option<String>,
        has_bullets: bool,
    },
    Image {
        number: u32,
    },
    Table {
        number: u32,
    },
}

impl ChunkKind {
    /// 1-based page or slide number.
    #[must_use]
    pub fn position(&self) -> u32 {
        match self {
            Self::Page { number }
            | Self::Slide { number, .. }
            | Self::Image { number }
            | Self::Table { number } => *number,
        }
    }
}

/// A unit of extracted document text with provenance metadata.
///
/// Every chunk has non-empty text except image placeholders, which carry
/// [`IMAGE_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub kind: ChunkKind,
}

impl Chunk {
    #[must_use]
    pub fn new(text: impl Into<String>, source: impl Into<String>, kind: ChunkKind) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_covers_all_variants() {
        assert_eq!(ChunkKind::Page { number: 3 }.position(), 3);
        assert_eq!(
            ChunkKind::Slide {
                number: 7,
                title: None,
                has_bullets: false
            }
            .position(),
            7
        );
        assert_eq!(ChunkKind::Image { number: 1 }.position(), 1);
        assert_eq!(ChunkKind::Table { number: 2 }.position(), 2);
    }

    #[test]
    fn chunk_round_trips_through_json() {
        let chunk = Chunk::new(
            "**Title:** Cells",
            "bio.pptx",
            ChunkKind::Slide {
                number: 4,
                title: Some("Cells".into()),
                has_bullets: true,
            },
        );
        let json = serde_json::to_string(&chunk).unwrap();
        let back: Chunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back, chunk);
    }
}
