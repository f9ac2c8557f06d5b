#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported format: {0} (upload a .pdf or .pptx file)")]
    UnsupportedFormat(String),

    #[error("failed to parse document {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("no content extracted from {0}")]
    NoContent(String),
}

impl DocumentError {
    pub(crate) fn parse(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
