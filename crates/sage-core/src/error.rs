use sage_llm::LlmError;
use sage_memory::IndexError;

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    Validation(String),

    #[error("the model returned no well-formed quiz questions, try again")]
    MalformedQuiz,

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
