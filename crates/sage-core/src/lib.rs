//! Retrieval-grounded study workflows: question answering, summarization,
//! quiz generation and grading over an indexed document.

pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod prompts;
pub mod quiz;
pub mod session;
pub mod workflow;

pub use config::Config;
pub use error::WorkflowError;
pub use progress::{ProgressStore, TopicProgress};
pub use quiz::{Label, Question, Quiz, parse_quiz};
pub use session::{CompletedQuiz, QuizSession};
pub use workflow::{
    GradeReport, Workflow, answer, classify, extract_topic, generate_quiz, grade, summarize,
};
