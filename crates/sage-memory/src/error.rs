#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("no chunks could be embedded")]
    NoContent,

    #[error("failed to persist index: {0}")]
    Persist(String),

    #[error("failed to load index: {0}")]
    Load(String),
}
